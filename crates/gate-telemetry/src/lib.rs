//! # Gate Telemetry
//!
//! Structured logging for the contract gate, built on `tracing`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_telemetry::{init_logging, LogConfig};
//!
//! fn main() {
//!     init_logging(&LogConfig::from_env()).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CG_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `CG_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `CG_LOG_SOURCE` | `false` | File and line in events |
//! | `CG_SERVICE_NAME` | `contract-gate` | Service name |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::LogConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Logging initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
