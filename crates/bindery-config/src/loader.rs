//! Layered configuration loading.
//!
//! Sources apply in order, later ones overriding earlier ones: defaults, a
//! TOML or JSON file (or inline string), then `PREFIX__SECTION__KEY`
//! environment variables.

use std::env;
use std::fs;
use std::path::Path;

use bindery_telemetry::LogFormat;

use crate::{BinderyConfig, ConfigError, ContactConfig, ExternalDocsConfig, LicenseConfig};

/// Environment prefix used by [`ConfigLoader::with_env`].
pub const DEFAULT_ENV_PREFIX: &str = "BINDERY";

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use bindery_config::ConfigLoader;
///
/// # fn main() -> Result<(), bindery_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("bindery.toml")?
///     .with_env()
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BinderyConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BinderyConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = BinderyConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use bindery_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = BinderyConfig::development();
        self
    }

    /// Load a configuration file. The format follows the extension,
    /// `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unknown extension, or does not parse (unknown keys included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = Self::parse(&content, format)?;
        Ok(self)
    }

    /// Load a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the named format (`toml` or `json`).
    ///
    /// ```
    /// use bindery_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[binding]\nmax_body_bytes = 2048", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.binding.max_body_bytes, 2048);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = Self::parse(content, format)?;
        Ok(self)
    }

    /// Apply environment overrides under [`DEFAULT_ENV_PREFIX`].
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Apply environment overrides of the form `PREFIX__SECTION__KEY`, e.g.
    /// `BINDERY__BINDING__MAX_BODY_BYTES=2048`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Seed the process environment from a `.env` file, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvError` if a `.env` file is found but
    /// cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::DotenvError(e.to_string())),
        }
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<BinderyConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration as loaded so far, skipping env overrides
    /// and validation.
    #[must_use]
    pub fn load_unvalidated(self) -> BinderyConfig {
        self.config
    }

    fn parse(content: &str, format: &str) -> Result<BinderyConfig, ConfigError> {
        match format.to_lowercase().as_str() {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = path.split("__").collect();
        let docs = &mut self.config.docs;

        match parts.as_slice() {
            ["DOCS", "TITLE"] => docs.title = value.to_string(),
            ["DOCS", "VERSION"] => docs.version = value.to_string(),
            ["DOCS", "SUMMARY"] => docs.summary = Some(value.to_string()),
            ["DOCS", "DESCRIPTION"] => docs.description = Some(value.to_string()),
            ["DOCS", "TERMS_OF_SERVICE"] => docs.terms_of_service = Some(value.to_string()),
            ["DOCS", "CONTACT", field] => {
                let contact = docs.contact.get_or_insert_with(ContactConfig::default);
                let slot = match *field {
                    "NAME" => &mut contact.name,
                    "URL" => &mut contact.url,
                    "EMAIL" => &mut contact.email,
                    _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
                };
                *slot = Some(value.to_string());
            }
            ["DOCS", "LICENSE", field] => {
                let license = docs.license.get_or_insert_with(LicenseConfig::default);
                match *field {
                    "NAME" => license.name = value.to_string(),
                    "URL" => license.url = Some(value.to_string()),
                    "IDENTIFIER" => license.identifier = Some(value.to_string()),
                    _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
                }
            }
            ["DOCS", "EXTERNAL_DOCS", field] => {
                let external = docs
                    .external_docs
                    .get_or_insert_with(ExternalDocsConfig::default);
                match *field {
                    "URL" => external.url = value.to_string(),
                    "DESCRIPTION" => external.description = Some(value.to_string()),
                    _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
                }
            }
            ["BINDING", "MAX_BODY_BYTES"] => {
                self.config.binding.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "DIRECTIVES"] => {
                self.config.logging.directives = value
                    .split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
        }

        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
