//! schema_reconcile: correspondence and reconciliation between a source schema
//! and the target schema converted from it
//!
//! Every object on either side carries a stable id assigned at import time.
//! From a snapshot of both sides this crate computes side-by-side mappings,
//! deletions, presentation trees annotated with conversion ratings, and
//! validates primary-key and check-constraint edits against the target's
//! interleaving layout. Every operation is a pure function of the snapshot.

pub mod config;
pub mod error;
pub mod schema;
pub mod utils;

use indexmap::IndexMap;
use std::sync::Arc;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use schema::{
    build_tree, CheckConstraintRow, ColumnRow, Correspondence, ForeignKeyRow, IndexKeyRow,
    SchemaDiff, SchemaSnapshot, SchemaStore, Side, SortOrder, TreeNode, ValidationError,
};
pub use utils::dialect::{Dialect, DialectTypeMaps};

use schema::types::{CheckConstraint, Index, ObjectId};

/// Initialize an explorer from a configuration file and a snapshot file
pub fn init(config_path: &str, snapshot_path: &str) -> Result<SchemaExplorer> {
    let config = config::load_from_file(config_path)?;
    let snapshot = SchemaSnapshot::load(snapshot_path)?;
    SchemaExplorer::new(config, snapshot)
}

/// Entry point for callers: the current snapshot plus configured defaults.
///
/// Each query runs against the snapshot current at call time. Callers that
/// observe schema changes call [`SchemaExplorer::replace_snapshot`] and
/// re-query; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SchemaExplorer {
    config: Config,
    type_maps: DialectTypeMaps,
    store: SchemaStore,
}

impl SchemaExplorer {
    /// Create an explorer from configuration and an initial snapshot
    pub fn new(config: Config, snapshot: SchemaSnapshot) -> Result<Self> {
        let type_maps = DialectTypeMaps::with_overrides(&config.type_mapping)?;

        Ok(Self {
            config,
            type_maps,
            store: SchemaStore::new(snapshot),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        self.store.snapshot()
    }

    /// Swap in the snapshot produced by a successful external mutation
    pub fn replace_snapshot(&mut self, snapshot: SchemaSnapshot) {
        self.store.replace(snapshot);
        tracing::debug!("Schema snapshot replaced");
    }

    /// Presentation tree for one side; `None` sorts by the configured default
    pub fn tree(&self, side: Side, search_text: &str, sort: Option<SortOrder>) -> TreeNode {
        let sort = sort.unwrap_or(self.config.explorer.default_sort);
        build_tree(&self.snapshot(), side, search_text, sort)
    }

    pub fn column_mapping(&self, table_id: &str) -> Vec<ColumnRow> {
        let snapshot = self.snapshot();
        self.correspondence(&snapshot).column_mapping(table_id)
    }

    pub fn foreign_key_mapping(&self, table_id: &str) -> Vec<ForeignKeyRow> {
        let snapshot = self.snapshot();
        self.correspondence(&snapshot).foreign_key_mapping(table_id)
    }

    pub fn index_mapping(&self, table_id: &str, index_id: &str) -> Vec<IndexKeyRow> {
        let snapshot = self.snapshot();
        self.correspondence(&snapshot).index_mapping(table_id, index_id)
    }

    pub fn check_constraints(&self, table_id: &str) -> Vec<CheckConstraintRow> {
        let snapshot = self.snapshot();
        schema::check_constraint_mapping(&snapshot.source_schema, &snapshot.target_schema, table_id)
    }

    pub fn deleted_indexes(&self) -> IndexMap<ObjectId, Vec<Index>> {
        let snapshot = self.snapshot();
        schema::deleted_indexes(&snapshot.source_schema, &snapshot.target_schema)
    }

    pub fn diff(&self) -> SchemaDiff {
        let snapshot = self.snapshot();
        SchemaDiff::generate(&snapshot.source_schema, &snapshot.target_schema)
    }

    pub fn interleave_peers(&self, table_id: &str) -> Vec<ObjectId> {
        schema::interleave_peers(table_id, &self.snapshot().target_schema)
    }

    pub fn validate_pk_edit<S: AsRef<str>>(
        &self,
        table_id: &str,
        proposed: &[S],
    ) -> std::result::Result<(), ValidationError> {
        schema::validate_pk_edit(&self.snapshot().target_schema, table_id, proposed)
    }

    pub fn validate_check_constraints(
        &self,
        proposed: &[CheckConstraint],
    ) -> std::result::Result<(), ValidationError> {
        schema::constraints::validate_check_constraints(proposed)
    }

    pub fn validate_index_name(
        &self,
        index_id: Option<&str>,
        proposed: &str,
    ) -> std::result::Result<(), ValidationError> {
        schema::validation::validate_index_name(&self.snapshot().target_schema, index_id, proposed)
    }

    pub fn validate_foreign_key_name(
        &self,
        fk_id: Option<&str>,
        proposed: &str,
    ) -> std::result::Result<(), ValidationError> {
        schema::validation::validate_foreign_key_name(&self.snapshot().target_schema, fk_id, proposed)
    }

    /// Dialect of the snapshot, or the configured one when it names none
    fn dialect(&self, snapshot: &SchemaSnapshot) -> Dialect {
        snapshot
            .target_dialect
            .unwrap_or(self.config.explorer.target_dialect)
    }

    fn correspondence<'a>(&'a self, snapshot: &'a SchemaSnapshot) -> Correspondence<'a> {
        Correspondence::new(&snapshot.source_schema, &snapshot.target_schema)
            .with_dialect(self.dialect(snapshot), &self.type_maps)
    }
}
