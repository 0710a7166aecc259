//! Immutable schema snapshots
//!
//! A snapshot bundles the source schema, the target schema derived from it and
//! the per-table conversion ratings. Snapshots are never edited in place; a
//! successful external mutation produces a whole new snapshot that replaces
//! the current one in the [`SchemaStore`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::types::{ConversionRateMap, DatabaseSchema, Rating};
use crate::utils::dialect::Dialect;

/// Source schema, target schema and ratings at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchemaSnapshot {
    pub source_schema: DatabaseSchema,
    pub target_schema: DatabaseSchema,
    #[serde(default)]
    pub rates: ConversionRateMap,
    /// Overrides the configured dialect when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_dialect: Option<Dialect>,
}

impl SchemaSnapshot {
    pub fn new(source_schema: DatabaseSchema, target_schema: DatabaseSchema) -> Self {
        Self {
            source_schema,
            target_schema,
            ..Default::default()
        }
    }

    /// Builder-style setter for the rate map
    pub fn with_rates(mut self, rates: ConversionRateMap) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.target_dialect = Some(dialect);
        self
    }

    /// Rating of a table, `NONE` when the rate map has no entry
    pub fn rating(&self, table_id: &str) -> Rating {
        self.rates.get(table_id).copied().unwrap_or_default()
    }

    /// Decode a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: SchemaSnapshot = serde_json::from_str(json)?;
        snapshot.check_keys()?;
        Ok(snapshot)
    }

    /// Decode a snapshot from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let snapshot: SchemaSnapshot = serde_yaml::from_str(yaml)?;
        snapshot.check_keys()?;
        Ok(snapshot)
    }

    /// Load a snapshot file; `.yaml`/`.yml` are read as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let snapshot = if is_yaml {
            Self::from_yaml_str(&text)?
        } else {
            Self::from_json_str(&text)?
        };

        tracing::debug!(
            path = %path.display(),
            source_tables = snapshot.source_schema.tables.len(),
            target_tables = snapshot.target_schema.tables.len(),
            "Loaded schema snapshot"
        );
        Ok(snapshot)
    }

    /// Map keys must agree with the ids of the records they hold
    fn check_keys(&self) -> Result<()> {
        for schema in [&self.source_schema, &self.target_schema] {
            for (key, table) in &schema.tables {
                if key != &table.id {
                    return Err(Error::SnapshotError(format!(
                        "Table '{}' is stored under key '{}' but has id '{}'",
                        table.name, key, table.id
                    )));
                }
                for (col_key, column) in &table.column_defs {
                    if col_key != &column.id {
                        return Err(Error::SnapshotError(format!(
                            "Column '{}' of table '{}' is stored under key '{}' but has id '{}'",
                            column.name, table.name, col_key, column.id
                        )));
                    }
                }
            }
            for (key, sequence) in &schema.sequences {
                if key != &sequence.id {
                    return Err(Error::SnapshotError(format!(
                        "Sequence '{}' is stored under key '{}' but has id '{}'",
                        sequence.name, key, sequence.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Holder of the current snapshot.
///
/// Readers take an `Arc` to the snapshot that is current at call time and keep
/// computing against it even if [`SchemaStore::replace`] swaps in a new one.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    current: Arc<SchemaSnapshot>,
}

impl SchemaStore {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self {
            current: Arc::new(snapshot),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        Arc::clone(&self.current)
    }

    /// Replace the snapshot wholesale, returning the previous one
    pub fn replace(&mut self, snapshot: SchemaSnapshot) -> Arc<SchemaSnapshot> {
        std::mem::replace(&mut self.current, Arc::new(snapshot))
    }
}
