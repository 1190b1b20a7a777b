//! Subscriber installation.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{LogConfig, TelemetryError};

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparseable filter directive and
/// [`TelemetryError::AlreadyInitialized`] if a global subscriber exists.
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(format!("{}: {e}", config.log_level)))?;

    if config.json_logs {
        // JSON output for containers/production
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(config.source_locations)
            .with_line_number(config.source_locations);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        // Pretty output for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(config.source_locations)
            .with_line_number(config.source_locations)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

/// Route events to the test harness's captured output.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Returns whether this call installed it.
pub fn init_test_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LogConfig {
            log_level: "contract_gate=bogus".to_string(),
            ..LogConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::Filter(_))
        ));
    }

    #[test]
    fn test_second_install_fails() {
        init_test_logging();
        assert!(!init_test_logging());
        assert!(matches!(
            init_logging(&LogConfig::default()),
            Err(TelemetryError::AlreadyInitialized(_))
        ));
    }
}
