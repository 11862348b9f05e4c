//! Generator configuration (surrogate.toml)
//!
//! ```toml
//! [naming]
//! namespace = "App\\Proxies"
//! factory = "staticProxyConstructor"
//! prefix_storage = "prefixInterceptors"
//! suffix_storage = "suffixInterceptors"
//!
//! [emit]
//! indent = 4
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::is_identifier;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Complete generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Naming of generated classes and members
    #[serde(default)]
    pub naming: NamingConfig,

    /// Source emission settings
    #[serde(default)]
    pub emit: EmitConfig,
}

/// Naming of generated classes and members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Namespace of generated classes (`\`-separated, may be empty)
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Name of the factory entry point
    #[serde(default = "default_factory")]
    pub factory: String,

    /// Base name of the prefix hook storage
    #[serde(default = "default_prefix_storage")]
    pub prefix_storage: String,

    /// Base name of the suffix hook storage
    #[serde(default = "default_suffix_storage")]
    pub suffix_storage: String,
}

fn default_namespace() -> String {
    "Surrogate".to_string()
}

fn default_factory() -> String {
    "staticProxyConstructor".to_string()
}

fn default_prefix_storage() -> String {
    "prefixInterceptors".to_string()
}

fn default_suffix_storage() -> String {
    "suffixInterceptors".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            factory: default_factory(),
            prefix_storage: default_prefix_storage(),
            suffix_storage: default_suffix_storage(),
        }
    }
}

/// Source emission settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Spaces per indentation level
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    4
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let naming = &self.naming;

        if !naming.namespace.is_empty() && !naming.namespace.split('\\').all(is_identifier) {
            return Err(ConfigError::ValidationError(format!(
                "namespace '{}' must be '\\'-separated identifiers",
                naming.namespace
            )));
        }

        for (key, value) in [
            ("factory", &naming.factory),
            ("prefix_storage", &naming.prefix_storage),
            ("suffix_storage", &naming.suffix_storage),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::ValidationError(format!(
                    "naming.{key} '{value}' is not an identifier"
                )));
            }
        }

        if naming.prefix_storage == naming.suffix_storage {
            return Err(ConfigError::ValidationError(
                "prefix and suffix storages need distinct names".to_string(),
            ));
        }

        if !(1..=8).contains(&self.emit.indent) {
            return Err(ConfigError::ValidationError(format!(
                "emit.indent must be between 1 and 8, got {}",
                self.emit.indent
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.naming.factory, "staticProxyConstructor");
        assert_eq!(config.emit.indent, 4);
    }

    #[test]
    fn test_invalid_indent() {
        let err = GeneratorConfig::from_str("[emit]\nindent = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_same_storage_names_rejected() {
        let toml = r#"
[naming]
prefix_storage = "hooks"
suffix_storage = "hooks"
"#;
        assert!(GeneratorConfig::from_str(toml).is_err());
    }
}
