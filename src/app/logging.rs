//! Logging initialization.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use super::error::AppError;

/// Filter from `RUST_LOG` when set, else from the configured level
pub fn filter(level: &str) -> Result<EnvFilter, AppError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| AppError::Logging(format!("invalid log level '{}': {}", level, e))),
    }
}

/// Install the global subscriber
///
/// Logs are written to stderr so stdout carries only the report.
pub fn init(level: &str) -> Result<(), AppError> {
    fmt::Subscriber::builder()
        .with_env_filter(filter(level)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
