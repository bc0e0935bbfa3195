//! Logging setup for processes that embed the controller.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. [`init_logging`] is the one-call setup used by the
//! controller processes and integration tests:
//!
//! ```rust,no_run
//! use helmsman::telemetry::{LogFormat, init_logging};
//!
//! init_logging(LogFormat::from_env()).expect("a subscriber is already installed");
//! ```
//!
//! `LOG_FORMAT=json` switches to one JSON object per line, anything else
//! keeps the human-readable layout. `RUST_LOG` filters events and falls
//! back to `info`.
//!
//! What shows up at each level:
//! - `error`: misconfigured instance types and election failures the handler swallowed
//! - `warn`: lost history writes, vacant leader records after a failed create,
//!   state models missing from the data cache, aborted pipeline passes
//! - `info`: won and lost elections, controller role start and release
//! - `debug`: per-stage pipeline timing and selection counts

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::constants::DEFAULT_LOG_FILTER;

/// Output layout of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        })
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT`; unset or unknown values mean [`LogFormat::Pretty`].
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default()
    }
}

/// Install the global subscriber.
///
/// Fails if one is already installed, so call it once from `main`.
pub fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("anything".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_default() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
