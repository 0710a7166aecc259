//! Configuration handling for schema_reconcile

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::tree::SortOrder;
use crate::utils::dialect::Dialect;

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e)))?;

    from_toml_str(&config_str)
}

/// Parse configuration from TOML text
pub fn from_toml_str(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)?;

    config.type_mapping.validate()?;
    Ok(config)
}

/// Represents the complete schema_reconcile configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub type_mapping: TypeMappingConfig,
    pub logging: Option<LoggingConfig>,
}

/// Defaults applied when a caller does not pass explicit parameters
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub default_sort: SortOrder,
    #[serde(default)]
    pub target_dialect: Dialect,
}

/// Extra entries layered over the built-in dialect type maps
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TypeMappingConfig {
    #[serde(default)]
    pub standard_to_dialect: IndexMap<String, String>,
    #[serde(default)]
    pub dialect_to_standard: IndexMap<String, String>,
}

impl TypeMappingConfig {
    /// Reject entries with a blank type name on either side
    pub fn validate(&self) -> Result<()> {
        let entries = self
            .standard_to_dialect
            .iter()
            .chain(self.dialect_to_standard.iter());

        for (from, to) in entries {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(Error::TypeMappingError(format!(
                    "Blank type name in mapping '{}' -> '{}'",
                    from, to
                )));
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub stdout: bool,
}

fn default_log_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_config() {
        let config = from_toml_str(
            r#"
            [explorer]
            default_sort = "desc"
            target_dialect = "postgresql"

            [type_mapping]
            standard_to_dialect = { STRING = "TEXT" }

            [logging]
            level = "debug"
            format = "json"
            stdout = true
            "#,
        )
        .unwrap();

        assert_eq!(config.explorer.default_sort, SortOrder::Desc);
        assert_eq!(config.explorer.target_dialect, Dialect::Postgresql);
        assert_eq!(config.type_mapping.standard_to_dialect["STRING"], "TEXT");
        assert_eq!(config.logging.unwrap().format, "json");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = from_toml_str("[explorer\ndefault_sort = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn empty_sort_value_sorts_ascending() {
        let config = from_toml_str("[explorer]\ndefault_sort = \"\"").unwrap();
        assert_eq!(config.explorer.default_sort, SortOrder::Asc);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = from_toml_str("").unwrap();

        assert_eq!(config.explorer.default_sort, SortOrder::Asc);
        assert_eq!(config.explorer.target_dialect, Dialect::GoogleStandardSql);
        assert!(config.logging.is_none());
    }

    #[test]
    fn blank_type_names_are_rejected() {
        let err = from_toml_str(
            r#"
            [type_mapping]
            dialect_to_standard = { "" = "STRING" }
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::TypeMappingError(_)));
    }
}
