//! Validation outcomes for proposed target-schema edits
//!
//! A failed validation is an ordinary return value: the edit is rejected and
//! the snapshot stays as it was.

use thiserror::Error;

use crate::schema::types::{DatabaseSchema, ObjectId};
use crate::utils::naming::{check_identifier_conflicts, same_identifier};

/// Why a proposed edit cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Primary key of table '{table}' cannot be empty")]
    EmptyPrimaryKey { table: String },

    #[error(
        "Primary key of table '{table}' breaks the interleaving key prefix with: {}",
        .peers.join(", ")
    )]
    InterleavePrefixViolation { table: String, peers: Vec<String> },

    #[error("Check constraint '{name}' with condition '{expression}' is defined more than once")]
    DuplicateCheckConstraint { name: String, expression: String },

    #[error("Index name '{name}' is already used by '{existing}'")]
    DuplicateIndexName { name: String, existing: String },

    #[error("Foreign key name '{name}' is already used by '{existing}'")]
    DuplicateForeignKeyName { name: String, existing: String },

    #[error("Table '{table_id}' does not exist in the target schema")]
    UnknownTable { table_id: ObjectId },
}

impl ValidationError {
    /// Tables named by the failure, for a consolidated message
    pub fn tables(&self) -> Vec<&str> {
        match self {
            ValidationError::EmptyPrimaryKey { table } => vec![table.as_str()],
            ValidationError::InterleavePrefixViolation { table, peers } => {
                std::iter::once(table.as_str())
                    .chain(peers.iter().map(String::as_str))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Names of all indexes in the target except `exclude_id`
fn index_names<'a>(target: &'a DatabaseSchema, exclude_id: Option<&'a str>) -> impl Iterator<Item = (&'a str, &'a str)> {
    target
        .tables
        .values()
        .flat_map(|t| t.indexes.iter())
        .filter(move |i| Some(i.id.as_str()) != exclude_id)
        .map(|i| (i.id.as_str(), i.name.as_str()))
}

/// Names of all foreign keys in the target except `exclude_id`
fn foreign_key_names<'a>(target: &'a DatabaseSchema, exclude_id: Option<&'a str>) -> impl Iterator<Item = (&'a str, &'a str)> {
    target
        .tables
        .values()
        .flat_map(|t| t.foreign_keys.iter())
        .filter(move |f| Some(f.id.as_str()) != exclude_id)
        .map(|f| (f.id.as_str(), f.name.as_str()))
}

/// First existing name colliding case-insensitively with `proposed`
fn collision<'a>(proposed: &str, mut existing: impl Iterator<Item = (&'a str, &'a str)>) -> Option<String> {
    existing
        .find(|(_, name)| same_identifier(name, proposed))
        .map(|(_, name)| name.to_string())
}

/// Accept `proposed` as the name of index `index_id` (or of a new index when `None`).
///
/// Index and foreign key names share one namespace in the target database.
pub fn validate_index_name(
    target: &DatabaseSchema,
    index_id: Option<&str>,
    proposed: &str,
) -> Result<(), ValidationError> {
    let existing = index_names(target, index_id).chain(foreign_key_names(target, None));
    match collision(proposed, existing) {
        Some(existing) => Err(ValidationError::DuplicateIndexName {
            name: proposed.to_string(),
            existing,
        }),
        None => Ok(()),
    }
}

/// Accept `proposed` as the name of foreign key `fk_id` (or of a new one when `None`)
pub fn validate_foreign_key_name(
    target: &DatabaseSchema,
    fk_id: Option<&str>,
    proposed: &str,
) -> Result<(), ValidationError> {
    let existing = foreign_key_names(target, fk_id).chain(index_names(target, None));
    match collision(proposed, existing) {
        Some(existing) => Err(ValidationError::DuplicateForeignKeyName {
            name: proposed.to_string(),
            existing,
        }),
        None => Ok(()),
    }
}

/// Check that no two indexes or foreign keys in the target share a name
pub fn validate_object_names(target: &DatabaseSchema) -> Result<(), ValidationError> {
    let indexes: Vec<&str> = index_names(target, None).map(|(_, name)| name).collect();
    if let Some((existing, name)) = check_identifier_conflicts(indexes.iter().copied(), true) {
        return Err(ValidationError::DuplicateIndexName { name, existing });
    }

    let all = indexes
        .iter()
        .copied()
        .chain(foreign_key_names(target, None).map(|(_, name)| name));
    if let Some((existing, name)) = check_identifier_conflicts(all, true) {
        return Err(ValidationError::DuplicateForeignKeyName { name, existing });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn violation_message_lists_every_peer() {
        let err = ValidationError::InterleavePrefixViolation {
            table: "Albums".into(),
            peers: vec!["Singers".into(), "Songs".into()],
        };

        assert_eq!(
            err.to_string(),
            "Primary key of table 'Albums' breaks the interleaving key prefix with: Singers, Songs"
        );
        assert_eq!(err.tables(), vec!["Albums", "Singers", "Songs"]);
    }

    #[test]
    fn index_names_collide_ignoring_case() {
        let target = fixtures::target_schema();

        assert_eq!(
            validate_index_name(&target, None, "IDX_CREATED"),
            Err(ValidationError::DuplicateIndexName {
                name: "IDX_CREATED".into(),
                existing: "idx_created".into(),
            })
        );
        assert_eq!(validate_index_name(&target, Some("i3"), "idx_created"), Ok(()));
        assert!(validate_index_name(&target, None, "fk_albums_singers").is_err());
        assert_eq!(validate_index_name(&target, None, "idx_fresh"), Ok(()));
    }

    #[test]
    fn foreign_key_names_collide_ignoring_case() {
        let target = fixtures::target_schema();

        assert!(matches!(
            validate_foreign_key_name(&target, None, "Fk_Albums_Singers"),
            Err(ValidationError::DuplicateForeignKeyName { .. })
        ));
        assert_eq!(validate_foreign_key_name(&target, Some("f1"), "fk_albums_singers"), Ok(()));
    }

    #[test]
    fn whole_schema_name_scan() {
        let mut target = fixtures::target_schema();
        assert_eq!(validate_object_names(&target), Ok(()));

        target.tables["t2"].add_index(crate::schema::types::Index::new("i7", "FK_ALBUMS_SINGERS", &["c6"]));
        assert_eq!(
            validate_object_names(&target),
            Err(ValidationError::DuplicateForeignKeyName {
                name: "fk_albums_singers".into(),
                existing: "FK_ALBUMS_SINGERS".into(),
            })
        );
    }
}
