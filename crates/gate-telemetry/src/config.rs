//! Logging configuration from environment variables.

use std::env;

/// Configuration for structured logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Service name attached to the startup event
    pub service_name: String,

    /// Filter directive (trace, debug, info, warn, error, or `target=level` lists)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include file and line in each event
    pub source_locations: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "contract-gate".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            source_locations: false,
        }
    }
}

impl LogConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CG_SERVICE_NAME`: Service name (default: contract-gate)
    /// - `CG_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `CG_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `CG_LOG_SOURCE`: Include file/line (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("CG_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("CG_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("CG_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(is_container),

            source_locations: lookup("CG_LOG_SOURCE")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.source_locations),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
