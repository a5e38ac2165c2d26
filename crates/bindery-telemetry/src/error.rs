//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to install the global subscriber.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A level or directive did not parse.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}
