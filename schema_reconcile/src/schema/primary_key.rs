//! Primary-key edit validation under interleaving
//!
//! An interleaved child's primary key must start with its parent's full
//! primary key, column for column by id. A proposed key is checked against
//! every interleave peer:
//!
//! - each ancestor's current key must be a prefix of the proposed key;
//! - the proposed key must be a prefix of each direct child's current key.
//!
//! The second rule means a parent key can only change while it stays a prefix
//! of every child key.

use crate::schema::interleave::InterleaveTopology;
use crate::schema::types::DatabaseSchema;
use crate::schema::validation::ValidationError;

/// Whether `prefix` equals the leading columns of `key`
pub fn is_key_prefix<A: AsRef<str>, B: AsRef<str>>(prefix: &[A], key: &[B]) -> bool {
    prefix.len() <= key.len()
        && prefix
            .iter()
            .zip(key.iter())
            .all(|(p, k)| p.as_ref() == k.as_ref())
}

/// Validate replacing the primary key of `table_id` with `proposed` column ids.
///
/// Has no side effect; the caller applies the edit only on `Ok`.
pub fn validate_pk_edit<S: AsRef<str>>(
    target: &DatabaseSchema,
    table_id: &str,
    proposed: &[S],
) -> Result<(), ValidationError> {
    let table_name = target.table_name(table_id).unwrap_or(table_id).to_string();

    if proposed.is_empty() {
        return Err(ValidationError::EmptyPrimaryKey { table: table_name });
    }
    if target.table(table_id).is_none() {
        return Err(ValidationError::UnknownTable {
            table_id: table_id.to_string(),
        });
    }

    let topology = InterleaveTopology::new(target);
    let ancestors = topology.ancestors(table_id);
    let peers = topology.peers(table_id);
    if peers.is_empty() {
        return Ok(());
    }

    let mut offending: Vec<String> = Vec::new();
    for peer_id in peers {
        let Some(peer) = target.table(peer_id) else {
            continue;
        };
        let peer_key = peer.primary_key_columns();

        let holds = if ancestors.contains(&peer_id) {
            is_key_prefix(&peer_key, proposed)
        } else {
            is_key_prefix(proposed, &peer_key)
        };

        if !holds {
            offending.push(peer.name.clone());
        }
    }

    if offending.is_empty() {
        Ok(())
    } else {
        tracing::info!(
            table = %table_name,
            peers = ?offending,
            "Rejected primary key edit"
        );
        Err(ValidationError::InterleavePrefixViolation {
            table: table_name,
            peers: offending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures;
    use crate::schema::types::{Column, ObjectId, Table};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parent_child() -> DatabaseSchema {
        let mut schema = DatabaseSchema::new("db");

        let mut parent = Table::new("p", "parent");
        parent.add_column(Column::new("c1", "Id", "INT64"));
        parent.set_primary_key(&["c1"]);
        schema.add_table(parent);

        let mut child = Table::new("ch", "child");
        child.add_column(Column::new("c1", "Id", "INT64"));
        child.add_column(Column::new("c2", "Seq", "INT64"));
        child.set_primary_key(&["c1", "c2"]);
        child.parent_id = Some("p".to_string());
        schema.add_table(child);

        schema
    }

    #[test]
    fn child_key_must_start_with_parent_key() {
        let schema = parent_child();

        assert_eq!(validate_pk_edit(&schema, "ch", &["c1", "c2"]), Ok(()));
        assert_eq!(
            validate_pk_edit(&schema, "ch", &["c2", "c1"]),
            Err(ValidationError::InterleavePrefixViolation {
                table: "child".into(),
                peers: vec!["parent".into()],
            })
        );
    }

    #[test]
    fn empty_key_is_rejected_first() {
        let empty: [&str; 0] = [];
        assert_eq!(
            validate_pk_edit(&parent_child(), "ch", &empty),
            Err(ValidationError::EmptyPrimaryKey { table: "child".into() })
        );
    }

    #[test]
    fn standalone_table_accepts_any_key() {
        let mut schema = parent_child();
        schema.add_table(Table::new("x", "standalone"));

        assert_eq!(validate_pk_edit(&schema, "x", &["anything"]), Ok(()));
    }

    #[test]
    fn unknown_table_is_reported() {
        assert_eq!(
            validate_pk_edit(&parent_child(), "nope", &["c1"]),
            Err(ValidationError::UnknownTable { table_id: "nope".into() })
        );
    }

    #[rstest]
    #[case(&["c1"], true)]
    #[case(&["c2"], false)]
    #[case(&["c1", "c2"], true)]
    #[case(&["c1", "c3"], false)]
    fn parent_key_must_stay_a_prefix_of_child_keys(#[case] proposed: &[&str], #[case] ok: bool) {
        assert_eq!(validate_pk_edit(&parent_child(), "p", proposed).is_ok(), ok);
    }

    #[test]
    fn middle_of_chain_names_every_offending_peer() {
        let target = fixtures::target_schema();

        assert_eq!(validate_pk_edit(&target, "t2", &["c1", "c5"]), Ok(()));
        assert_eq!(
            validate_pk_edit(&target, "t2", &["c5", "c1"]),
            Err(ValidationError::InterleavePrefixViolation {
                table: "Albums".into(),
                peers: vec!["Singers".into(), "Songs".into()],
            })
        );
        assert_eq!(
            validate_pk_edit(&target, "t2", &["c1", "c6"]),
            Err(ValidationError::InterleavePrefixViolation {
                table: "Albums".into(),
                peers: vec!["Songs".into()],
            })
        );
    }

    #[test]
    fn grand_ancestor_key_is_checked_too() {
        let target = fixtures::target_schema();

        let ids: Vec<ObjectId> = vec!["c9".into(), "c1".into(), "c5".into()];
        let err = validate_pk_edit(&target, "t3", &ids).unwrap_err();
        assert_eq!(err.tables(), vec!["Songs", "Albums", "Singers"]);
    }

    #[test]
    fn prefix_helper() {
        assert!(is_key_prefix(&["a"], &["a", "b"]));
        assert!(!is_key_prefix(&["a", "b"], &["a"]));
        assert!(is_key_prefix::<&str, &str>(&[], &["a"]));
    }
}
