//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `ContractGateApi`
//! - **Driven Ports (Outbound)**: `SolidityCompiler`, `ImportResolver`
//! - No concrete compiler or filesystem access in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
