//! Observability and telemetry.
//!
//! Installs the global `tracing` subscriber. Metrics are recorded through the
//! `metrics` facade; installing an exporter is left to the embedding
//! application.

use crate::config::{LogFormat, LoggingSettings};
use crate::{Error, Result};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive that overrides the config.
pub const LOG_ENV_VAR: &str = "REMINISCE_LOG";

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Builds the filter: `REMINISCE_LOG` when set and valid, otherwise `level`.
///
/// `verbose` forces at least debug output for this crate.
#[must_use]
pub fn build_filter(settings: &LoggingSettings, verbose: bool) -> EnvFilter {
    let base = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(&settings.level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    if verbose {
        match "reminisce=debug".parse() {
            Ok(directive) => base.add_directive(directive),
            Err(_) => base,
        }
    } else {
        base
    }
}

/// Initializes logging to stderr.
///
/// # Errors
///
/// Returns an error if logging was already initialized by this crate or a
/// global subscriber is already set.
pub fn init_logging(settings: &LoggingSettings, verbose: bool) -> Result<()> {
    if LOGGING_INIT.get().is_some() {
        return Err(Error::OperationFailed {
            operation: "logging_init".to_string(),
            cause: "logging already initialized".to_string(),
        });
    }

    let filter = build_filter(settings, verbose);
    match settings.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_target(true),
            )
            .with(filter)
            .try_init()
            .map_err(init_error)?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init()
            .map_err(init_error)?,
    }

    LOGGING_INIT.set(()).map_err(|()| Error::OperationFailed {
        operation: "logging_init".to_string(),
        cause: "failed to mark logging initialized".to_string(),
    })
}

fn init_error(e: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: "logging_init".to_string(),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_uses_level() {
        let settings = LoggingSettings {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        };
        let filter = build_filter(&settings, false);
        assert!(filter.to_string().contains("info"));
    }

    #[test]
    fn test_build_filter_verbose_adds_crate_debug() {
        let filter = build_filter(&LoggingSettings::default(), true);
        assert!(filter.to_string().contains("reminisce=debug"));
    }

    #[test]
    fn test_init_twice_fails() {
        let settings = LoggingSettings::default();
        // The first call may fail if another test installed a subscriber.
        let _ = init_logging(&settings, false);
        assert!(init_logging(&settings, false).is_err());
    }
}
