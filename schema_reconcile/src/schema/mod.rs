//! Schema module for schema_reconcile
//!
//! This module holds the two-sided schema model and everything derived from
//! it: correspondence lookups, diffs, presentation trees, interleave topology
//! and edit validation.

pub mod constraints;
pub mod correspondence;
pub mod diff;
pub mod interleave;
pub mod primary_key;
pub mod store;
pub mod tree;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export key types
pub use constraints::{check_constraint_mapping, pair_check_constraints, CheckConstraintRow};
pub use correspondence::{
    resolve, ColumnRow, Correspondence, Counterpart, ForeignKeyRow, IndexKeyRow,
};
pub use diff::{deleted_indexes, deleted_tables, SchemaDiff};
pub use interleave::{interleave_peers, InterleaveTopology};
pub use primary_key::validate_pk_edit;
pub use store::{SchemaSnapshot, SchemaStore};
pub use tree::{build_tree, NodeKind, NodeStatus, Side, SortOrder, TreeNode};
pub use types::{
    CheckConstraint, Column, ColumnType, ConversionRateMap, DatabaseSchema, ForeignKey, Index,
    KeyPart, ObjectId, Rating, Sequence, Table,
};
pub use validation::ValidationError;
