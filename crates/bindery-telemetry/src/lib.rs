//! Logging setup for Bindery services.
//!
//! Bindery crates log through `tracing` macros using the field names in
//! [`fields`]. This crate installs the subscriber that prints them:
//!
//! - **JSON** (default): one object per line, for log collectors
//! - **Pretty**: multi-line human-readable output for development
//!
//! Levels and per-target directives are combined into one `EnvFilter`.

#![doc(html_root_url = "https://docs.rs/bindery-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
