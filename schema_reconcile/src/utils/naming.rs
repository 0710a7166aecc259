//! Naming utilities for schema_reconcile
//!
//! Case-insensitive matching used by tree search and name-collision checks.

use std::collections::HashMap;

/// Case-insensitive substring match. An empty needle matches everything.
pub fn contains_ignore_case(name: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    name.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive equality of two identifiers
pub fn same_identifier(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Check for name conflicts in a list of identifiers.
///
/// Returns the first pair of names that collide, in input order.
pub fn check_identifier_conflicts<'a, I>(names: I, ignore_case: bool) -> Option<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashMap::<String, &str>::new();

    for name in names {
        let key = if ignore_case { name.to_lowercase() } else { name.to_string() };

        if let Some(existing) = seen.get(&key) {
            return Some((existing.to_string(), name.to_string()));
        }
        seen.insert(key, name);
    }

    None
}
