//! Main configuration type.

use bindery_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{BindingConfig, ConfigError, DocsConfig};

/// Complete Bindery configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use bindery_config::BinderyConfig;
///
/// let config = BinderyConfig::default();
/// assert_eq!(config.binding.max_body_bytes, 1024 * 1024);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BinderyConfig {
    /// API document metadata.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Request binding settings.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LogConfig,
}

impl BinderyConfig {
    /// Development preset: debug level, pretty output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the document title or version is empty
    /// - `binding.max_body_bytes` is zero
    /// - the log level or a directive does not parse
    /// - an external docs link or license has no URL or name
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.docs.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.title", "must not be empty"));
        }
        if self.docs.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.version", "must not be empty"));
        }
        if self.docs.license.as_ref().is_some_and(|l| l.name.is_empty()) {
            return Err(ConfigError::invalid_value("docs.license.name", "must not be empty"));
        }
        if self.docs.external_docs.as_ref().is_some_and(|d| d.url.is_empty()) {
            return Err(ConfigError::invalid_value("docs.external_docs.url", "must not be empty"));
        }
        if self.binding.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_body_bytes",
                "must be greater than 0",
            ));
        }
        bindery_telemetry::create_env_filter(&self.logging.filter_string())
            .map_err(|e| ConfigError::invalid_value("logging", e.to_string()))?;
        Ok(())
    }
}
