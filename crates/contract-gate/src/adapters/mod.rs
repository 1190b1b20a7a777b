//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.
//!
//! - `solc`: `SolidityCompiler` over a native `solc --standard-json` process
//! - `import_resolver`: `ImportResolver` over local search paths
//! - `standard_json`: compiler wire format

pub mod import_resolver;
pub mod solc;
pub mod standard_json;

pub use import_resolver::{resolve_sources, FilesystemImportResolver};
pub use solc::SolcCompiler;
pub use standard_json::{StandardJsonInput, StandardJsonOutput};
