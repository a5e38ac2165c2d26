//! Typed configuration for Bindery.
//!
//! Configuration is layered: defaults, then a TOML or JSON file, then
//! `BINDERY__SECTION__KEY` environment variables. Unknown keys are errors.
//!
//! ```toml
//! [docs]
//! title = "Greeter"
//! version = "1.0.0"
//!
//! [binding]
//! max_body_bytes = 65536
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Example
//!
//! ```
//! use bindery_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().with_env().load().unwrap();
//! assert!(config.binding.max_body_bytes > 0);
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use bindery_telemetry::{LogConfig, LogFormat};
pub use config::BinderyConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    BindingConfig, ContactConfig, DocsConfig, ExternalDocsConfig, LicenseConfig,
    DEFAULT_MAX_BODY_BYTES,
};
