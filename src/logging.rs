//! Logging System
//!
//! Structured logging via the `tracing` crate. The level filter comes from
//! configuration but `RUST_LOG` always wins, so operators can crank up a
//! single module without touching config files.

use crate::config::LoggingSettings;
use crate::error::AssemblyError;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize the global subscriber from logging settings.
///
/// Safe to call once per process; a second call returns an error from the
/// subscriber registry.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), AssemblyError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| AssemblyError::Config(format!("invalid log level: {e}")))?;

    let timer = ChronoUtc::new("%Y-%m-%dT%H:%M:%S%.3fZ".to_string());

    match settings.format.as_str() {
        "json" => {
            let layer = fmt::layer()
                .json()
                .with_timer(timer)
                .with_writer(std::io::stderr);
            Registry::default()
                .with(filter)
                .with(layer)
                .try_init()
                .map_err(|e| AssemblyError::Config(format!("failed to init logging: {e}")))
        }
        "text" => {
            let layer = fmt::layer()
                .with_timer(timer)
                .with_writer(std::io::stderr);
            Registry::default()
                .with(filter)
                .with(layer)
                .try_init()
                .map_err(|e| AssemblyError::Config(format!("failed to init logging: {e}")))
        }
        other => Err(AssemblyError::Config(format!(
            "unknown log format: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_is_rejected() {
        let settings = LoggingSettings {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        assert!(matches!(
            init_logging(&settings),
            Err(AssemblyError::Config(_))
        ));
    }
}
