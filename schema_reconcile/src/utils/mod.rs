//! Utilities for schema_reconcile
//!
//! This module provides utility functions used across the library.

pub mod dialect;
pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use dialect::{Dialect, DialectTypeMaps, TypeMap};
pub use naming::{check_identifier_conflicts, contains_ignore_case, same_identifier};
