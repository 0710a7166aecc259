//! Schema difference calculator
//!
//! Compares the source schema with the target schema derived from it. All
//! matching is by object id, so a renamed object is a change, not a
//! drop-and-add.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use crate::schema::types::{DatabaseSchema, Index, ObjectId, Table};

/// Indexes dropped from tables that exist on both sides, keyed by table id.
///
/// Tables missing from the target entirely are not reported here, see
/// [`deleted_tables`].
pub fn deleted_indexes(
    source: &DatabaseSchema,
    target: &DatabaseSchema,
) -> IndexMap<ObjectId, Vec<Index>> {
    let mut deleted = IndexMap::new();

    for (table_id, src_table) in &source.tables {
        let Some(tgt_table) = target.tables.get(table_id) else {
            continue;
        };

        let target_ids: HashSet<&str> = tgt_table.indexes.iter().map(|i| i.id.as_str()).collect();
        let dropped: Vec<Index> = src_table
            .indexes
            .iter()
            .filter(|index| !target_ids.contains(index.id.as_str()))
            .cloned()
            .collect();

        if !dropped.is_empty() {
            deleted.insert(table_id.clone(), dropped);
        }
    }

    deleted
}

/// Source tables with no target counterpart, in source order
pub fn deleted_tables<'a>(source: &'a DatabaseSchema, target: &DatabaseSchema) -> Vec<&'a Table> {
    source
        .tables
        .values()
        .filter(|table| !target.tables.contains_key(&table.id))
        .collect()
}

/// A column whose id survives under a different name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRename {
    pub column_id: ObjectId,
    pub from: String,
    pub to: String,
}

/// Summary of everything that differs between the two sides
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaDiff {
    pub tables_added: Vec<ObjectId>,
    pub tables_deleted: Vec<ObjectId>,
    pub tables_renamed: Vec<ObjectId>,
    pub columns_added: IndexMap<ObjectId, Vec<ObjectId>>,
    pub columns_deleted: IndexMap<ObjectId, Vec<ObjectId>>,
    pub columns_renamed: IndexMap<ObjectId, Vec<ColumnRename>>,
    pub indexes_added: IndexMap<ObjectId, Vec<ObjectId>>,
    pub indexes_deleted: IndexMap<ObjectId, Vec<ObjectId>>,
    pub foreign_keys_added: IndexMap<ObjectId, Vec<ObjectId>>,
    pub foreign_keys_deleted: IndexMap<ObjectId, Vec<ObjectId>>,
}

impl SchemaDiff {
    /// Generate a diff between a source schema and its target
    pub fn generate(source: &DatabaseSchema, target: &DatabaseSchema) -> Self {
        let mut diff = SchemaDiff {
            tables_added: target
                .tables
                .keys()
                .filter(|id| !source.tables.contains_key(*id))
                .cloned()
                .collect(),
            tables_deleted: deleted_tables(source, target)
                .into_iter()
                .map(|t| t.id.clone())
                .collect(),
            ..Default::default()
        };

        for (table_id, src_table) in &source.tables {
            let Some(tgt_table) = target.tables.get(table_id) else {
                continue;
            };

            if src_table.name != tgt_table.name {
                diff.tables_renamed.push(table_id.clone());
            }

            let renamed: Vec<ColumnRename> = src_table
                .column_ids
                .iter()
                .filter_map(|id| {
                    let from = src_table.column_name(id)?;
                    let to = tgt_table.column_name(id)?;
                    (from != to).then(|| ColumnRename {
                        column_id: id.clone(),
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                })
                .collect();
            insert_non_empty(&mut diff.columns_renamed, table_id, renamed);

            insert_non_empty(
                &mut diff.columns_added,
                table_id,
                only_in(&tgt_table.column_ids, &src_table.column_ids),
            );
            insert_non_empty(
                &mut diff.columns_deleted,
                table_id,
                only_in(&src_table.column_ids, &tgt_table.column_ids),
            );

            let src_indexes: Vec<ObjectId> = src_table.indexes.iter().map(|i| i.id.clone()).collect();
            let tgt_indexes: Vec<ObjectId> = tgt_table.indexes.iter().map(|i| i.id.clone()).collect();
            insert_non_empty(&mut diff.indexes_added, table_id, only_in(&tgt_indexes, &src_indexes));
            insert_non_empty(&mut diff.indexes_deleted, table_id, only_in(&src_indexes, &tgt_indexes));

            let src_fks: Vec<ObjectId> = src_table.foreign_keys.iter().map(|f| f.id.clone()).collect();
            let tgt_fks: Vec<ObjectId> = tgt_table.foreign_keys.iter().map(|f| f.id.clone()).collect();
            insert_non_empty(&mut diff.foreign_keys_added, table_id, only_in(&tgt_fks, &src_fks));
            insert_non_empty(&mut diff.foreign_keys_deleted, table_id, only_in(&src_fks, &tgt_fks));
        }

        tracing::debug!(
            tables_added = diff.tables_added.len(),
            tables_deleted = diff.tables_deleted.len(),
            "Generated schema diff"
        );
        diff
    }

    /// Check if the diff is empty (the two sides line up exactly)
    pub fn is_empty(&self) -> bool {
        self.tables_added.is_empty()
            && self.tables_deleted.is_empty()
            && self.tables_renamed.is_empty()
            && self.columns_added.is_empty()
            && self.columns_deleted.is_empty()
            && self.columns_renamed.is_empty()
            && self.indexes_added.is_empty()
            && self.indexes_deleted.is_empty()
            && self.foreign_keys_added.is_empty()
            && self.foreign_keys_deleted.is_empty()
    }
}

/// Ids in `ids` that are absent from `other`, keeping `ids` order
fn only_in(ids: &[ObjectId], other: &[ObjectId]) -> Vec<ObjectId> {
    let other: HashSet<&ObjectId> = other.iter().collect();
    ids.iter().filter(|id| !other.contains(id)).cloned().collect()
}

fn insert_non_empty<T>(map: &mut IndexMap<ObjectId, Vec<T>>, key: &ObjectId, values: Vec<T>) {
    if !values.is_empty() {
        map.insert(key.clone(), values);
    }
}
