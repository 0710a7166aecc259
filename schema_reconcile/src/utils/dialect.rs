//! Target dialects and the type-name maps between them
//!
//! Target column types are stored under their Standard-SQL (GoogleSQL) names.
//! A PostgreSQL-dialect target displays them through [`DialectTypeMaps`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::TypeMappingConfig;
use crate::error::Result;

/// Mapping from one type name to another
pub type TypeMap = IndexMap<String, String>;

/// SQL dialect of the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    #[serde(alias = "googlesql", alias = "google_sql")]
    GoogleStandardSql,
    #[serde(alias = "pg")]
    Postgresql,
}

impl Dialect {
    /// Whether stored type names must be re-expressed before display
    pub fn requires_translation(self) -> bool {
        matches!(self, Dialect::Postgresql)
    }
}

static STANDARD_TO_POSTGRES: Lazy<TypeMap> = Lazy::new(|| {
    [
        ("BOOL", "BOOL"),
        ("BYTES", "BYTEA"),
        ("DATE", "DATE"),
        ("FLOAT32", "FLOAT4"),
        ("FLOAT64", "FLOAT8"),
        ("INT64", "INT8"),
        ("JSON", "JSONB"),
        ("NUMERIC", "NUMERIC"),
        ("STRING", "VARCHAR"),
        ("TIMESTAMP", "TIMESTAMPTZ"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
});

static POSTGRES_TO_STANDARD: Lazy<TypeMap> = Lazy::new(|| {
    STANDARD_TO_POSTGRES
        .iter()
        .map(|(standard, dialect)| (dialect.clone(), standard.clone()))
        .collect()
});

/// Type maps in both directions between Standard-SQL and dialect names
#[derive(Debug, Clone, PartialEq)]
pub struct DialectTypeMaps {
    pub standard_to_dialect: TypeMap,
    pub dialect_to_standard: TypeMap,
}

impl Default for DialectTypeMaps {
    fn default() -> Self {
        Self {
            standard_to_dialect: STANDARD_TO_POSTGRES.clone(),
            dialect_to_standard: POSTGRES_TO_STANDARD.clone(),
        }
    }
}

impl DialectTypeMaps {
    /// Built-in maps with configured entries layered on top
    pub fn with_overrides(config: &TypeMappingConfig) -> Result<Self> {
        config.validate()?;

        let mut maps = Self::default();
        maps.standard_to_dialect
            .extend(config.standard_to_dialect.iter().map(|(k, v)| (k.clone(), v.clone())));
        maps.dialect_to_standard
            .extend(config.dialect_to_standard.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(maps)
    }

    /// Name to display for a stored Standard-SQL type under `dialect`.
    /// Falls back to the untranslated name when the map has no entry.
    pub fn display_name(&self, dialect: Dialect, standard_name: &str) -> String {
        if !dialect.requires_translation() {
            return standard_name.to_string();
        }

        self.standard_to_dialect
            .get(standard_name)
            .cloned()
            .unwrap_or_else(|| standard_name.to_string())
    }

    /// Standard-SQL name for a dialect type name, falling back to the input
    pub fn standard_name(&self, dialect: Dialect, dialect_name: &str) -> String {
        if !dialect.requires_translation() {
            return dialect_name.to_string();
        }

        self.dialect_to_standard
            .get(dialect_name)
            .cloned()
            .unwrap_or_else(|| dialect_name.to_string())
    }
}
