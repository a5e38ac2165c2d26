//! Configuration schema types.
//!
//! This module defines the structure of the `docs` and `binding` sections.
//! The `logging` section is [`bindery_telemetry::LogConfig`].

use serde::{Deserialize, Serialize};

/// Default body size limit: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// API document metadata.
///
/// # Example
///
/// ```
/// use bindery_config::DocsConfig;
///
/// let config = DocsConfig {
///     title: "Greeter".to_string(),
///     version: "2.0.0".to_string(),
///     ..Default::default()
/// };
/// assert!(config.contact.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Short summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// Long description.
    #[serde(default)]
    pub description: Option<String>,

    /// Terms of service URL.
    #[serde(default)]
    pub terms_of_service: Option<String>,

    /// Contact details.
    #[serde(default)]
    pub contact: Option<ContactConfig>,

    /// License details.
    #[serde(default)]
    pub license: Option<LicenseConfig>,

    /// External documentation link.
    #[serde(default)]
    pub external_docs: Option<ExternalDocsConfig>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            summary: None,
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            external_docs: None,
        }
    }
}

fn default_title() -> String {
    "Bindery API".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Contact details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContactConfig {
    /// Contact name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// License details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LicenseConfig {
    /// License name.
    #[serde(default)]
    pub name: String,
    /// License URL.
    #[serde(default)]
    pub url: Option<String>,
    /// SPDX identifier.
    #[serde(default)]
    pub identifier: Option<String>,
}

/// External documentation link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExternalDocsConfig {
    /// Link description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link URL.
    #[serde(default)]
    pub url: String,
}

/// Request binding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Largest accepted JSON body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_defaults() {
        let config = DocsConfig::default();
        assert_eq!(config.title, "Bindery API");
        assert_eq!(config.version, "0.1.0");
        assert!(config.license.is_none());
    }

    #[test]
    fn test_binding_defaults() {
        assert_eq!(BindingConfig::default().max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_partial_docs_section() {
        let config: DocsConfig = toml::from_str(
            r#"
            title = "Greeter"

            [contact]
            email = "team@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "Greeter");
        assert_eq!(config.version, "0.1.0");
        assert_eq!(config.contact.unwrap().email.as_deref(), Some("team@example.com"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<BindingConfig, _> = toml::from_str("max_body = 10");
        assert!(result.is_err());
    }
}
