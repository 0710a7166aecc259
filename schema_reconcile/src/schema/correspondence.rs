//! Correspondence between source and target objects
//!
//! Objects correspond when they share an [`ObjectId`]. Every lookup is done
//! independently on each side, so an object missing on one side simply yields
//! `None` for that half of the result.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use crate::schema::types::{
    Column, DatabaseSchema, ForeignKey, Identified, Index, ObjectId, Table,
};
use crate::utils::dialect::{Dialect, DialectTypeMaps};

/// A collection that can find an object by id
pub trait Lookup<T> {
    fn lookup(&self, id: &str) -> Option<&T>;
}

impl<T> Lookup<T> for IndexMap<ObjectId, T> {
    fn lookup(&self, id: &str) -> Option<&T> {
        self.get(id)
    }
}

impl<T: Identified> Lookup<T> for [T] {
    fn lookup(&self, id: &str) -> Option<&T> {
        self.iter().find(|item| item.id() == id)
    }
}

impl<T: Identified> Lookup<T> for Vec<T> {
    fn lookup(&self, id: &str) -> Option<&T> {
        self.as_slice().lookup(id)
    }
}

/// Source and target halves of one object; either may be missing
#[derive(Debug, PartialEq)]
pub struct Counterpart<'a, T> {
    pub source: Option<&'a T>,
    pub target: Option<&'a T>,
}

impl<'a, T> Clone for Counterpart<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Counterpart<'a, T> {}

impl<'a, T> Counterpart<'a, T> {
    pub fn none() -> Self {
        Self {
            source: None,
            target: None,
        }
    }

    /// Present in the source only
    pub fn is_deleted(&self) -> bool {
        self.source.is_some() && self.target.is_none()
    }

    /// Present in the target only
    pub fn is_added(&self) -> bool {
        self.source.is_none() && self.target.is_some()
    }

    pub fn is_matched(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }
}

/// Look `id` up in both collections independently
pub fn resolve<'a, T, C>(id: &str, source: &'a C, target: &'a C) -> Counterpart<'a, T>
where
    C: Lookup<T> + ?Sized,
{
    Counterpart {
        source: source.lookup(id),
        target: target.lookup(id),
    }
}

/// One side of a column comparison row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSide {
    /// 1-based position within its own table
    pub position: usize,
    pub name: String,
    pub data_type: String,
    pub is_array: bool,
    pub max_length: Option<i64>,
    pub is_primary_key: bool,
    pub not_null: bool,
    pub auto_gen: Option<String>,
    pub default_value: Option<String>,
}

/// A column compared across both sides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRow {
    pub column_id: ObjectId,
    pub source: Option<ColumnSide>,
    pub target: Option<ColumnSide>,
}

impl ColumnRow {
    /// Same column on both sides under different names
    pub fn is_renamed(&self) -> bool {
        match (&self.source, &self.target) {
            (Some(src), Some(tgt)) => src.name != tgt.name,
            _ => false,
        }
    }
}

/// One side of a foreign key comparison row.
///
/// Column ids that no longer resolve to a column render as empty strings so
/// the lists stay positionally aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeySide {
    pub name: String,
    pub columns: Vec<String>,
    pub refer_table: String,
    pub refer_columns: Vec<String>,
    pub on_delete: Option<String>,
}

/// A source foreign key and its target counterpart, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyRow {
    pub foreign_key_id: ObjectId,
    pub source: ForeignKeySide,
    pub target: Option<ForeignKeySide>,
}

/// One side of an index key comparison row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexKeySide {
    pub column_name: String,
    pub order: u32,
    pub desc: bool,
}

/// An index key column compared across both sides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexKeyRow {
    pub column_id: ObjectId,
    pub source: Option<IndexKeySide>,
    pub target: Option<IndexKeySide>,
}

/// Correspondence lookups over one source/target pair
#[derive(Debug, Clone, Copy)]
pub struct Correspondence<'a> {
    source: &'a DatabaseSchema,
    target: &'a DatabaseSchema,
    dialect: Dialect,
    type_maps: Option<&'a DialectTypeMaps>,
}

impl<'a> Correspondence<'a> {
    pub fn new(source: &'a DatabaseSchema, target: &'a DatabaseSchema) -> Self {
        Self {
            source,
            target,
            dialect: Dialect::default(),
            type_maps: None,
        }
    }

    /// Display target column types through `type_maps` for `dialect`
    pub fn with_dialect(mut self, dialect: Dialect, type_maps: &'a DialectTypeMaps) -> Self {
        self.dialect = dialect;
        self.type_maps = Some(type_maps);
        self
    }

    pub fn table(&self, table_id: &str) -> Counterpart<'a, Table> {
        resolve(table_id, &self.source.tables, &self.target.tables)
    }

    pub fn column(&self, table_id: &str, column_id: &str) -> Counterpart<'a, Column> {
        let tables = self.table(table_id);
        Counterpart {
            source: tables.source.and_then(|t| t.column_defs.lookup(column_id)),
            target: tables.target.and_then(|t| t.column_defs.lookup(column_id)),
        }
    }

    pub fn index(&self, table_id: &str, index_id: &str) -> Counterpart<'a, Index> {
        let tables = self.table(table_id);
        Counterpart {
            source: tables.source.and_then(|t| t.indexes.lookup(index_id)),
            target: tables.target.and_then(|t| t.indexes.lookup(index_id)),
        }
    }

    pub fn foreign_key(&self, table_id: &str, fk_id: &str) -> Counterpart<'a, ForeignKey> {
        let tables = self.table(table_id);
        Counterpart {
            source: tables.source.and_then(|t| t.foreign_keys.lookup(fk_id)),
            target: tables.target.and_then(|t| t.foreign_keys.lookup(fk_id)),
        }
    }

    /// Side-by-side column rows for a table.
    ///
    /// Rows follow the source declaration order; target columns with no
    /// source counterpart are appended afterwards in target order.
    pub fn column_mapping(&self, table_id: &str) -> Vec<ColumnRow> {
        let tables = self.table(table_id);
        let mut rows = Vec::new();

        if let Some(src_table) = tables.source {
            for column_id in &src_table.column_ids {
                let source = src_table
                    .column(column_id)
                    .map(|c| self.column_side(src_table, c, false));
                let target = tables
                    .target
                    .and_then(|t| t.column(column_id).map(|c| self.column_side(t, c, true)));

                rows.push(ColumnRow {
                    column_id: column_id.clone(),
                    source,
                    target,
                });
            }
        }

        if let Some(tgt_table) = tables.target {
            for column_id in &tgt_table.column_ids {
                let in_source = tables
                    .source
                    .map_or(false, |t| t.column_defs.contains_key(column_id));
                if in_source {
                    continue;
                }
                if let Some(column) = tgt_table.column(column_id) {
                    rows.push(ColumnRow {
                        column_id: column_id.clone(),
                        source: None,
                        target: Some(self.column_side(tgt_table, column, true)),
                    });
                }
            }
        }

        tracing::debug!(table_id, rows = rows.len(), "Built column mapping");
        rows
    }

    /// Source foreign keys in declaration order, each with its target counterpart
    pub fn foreign_key_mapping(&self, table_id: &str) -> Vec<ForeignKeyRow> {
        let tables = self.table(table_id);
        let src_table = match tables.source {
            Some(t) => t,
            None => return Vec::new(),
        };

        src_table
            .foreign_keys
            .iter()
            .map(|src_fk| {
                let target = tables.target.and_then(|tgt_table| {
                    tgt_table
                        .foreign_keys
                        .lookup(&src_fk.id)
                        .map(|tgt_fk| foreign_key_side(self.target, tgt_table, tgt_fk))
                });

                ForeignKeyRow {
                    foreign_key_id: src_fk.id.clone(),
                    source: foreign_key_side(self.source, src_table, src_fk),
                    target,
                }
            })
            .collect()
    }

    /// Key columns of one index on both sides.
    ///
    /// Source key order comes first, then key columns only the target has.
    pub fn index_mapping(&self, table_id: &str, index_id: &str) -> Vec<IndexKeyRow> {
        let tables = self.table(table_id);
        let indexes = self.index(table_id, index_id);
        let mut rows = Vec::new();
        let mut seen = HashSet::new();

        let key_side = |table: Option<&Table>, index: Option<&Index>, column_id: &str| {
            index.and_then(|i| i.key(column_id)).map(|key| IndexKeySide {
                column_name: table
                    .and_then(|t| t.column_name(column_id))
                    .unwrap_or_default()
                    .to_string(),
                order: key.order,
                desc: key.desc,
            })
        };

        let source_keys = indexes.source.map(|i| i.keys.as_slice()).unwrap_or_default();
        let target_keys = indexes.target.map(|i| i.keys.as_slice()).unwrap_or_default();

        for key in source_keys.iter().chain(target_keys.iter()) {
            if !seen.insert(key.column_id.as_str()) {
                continue;
            }
            rows.push(IndexKeyRow {
                column_id: key.column_id.clone(),
                source: key_side(tables.source, indexes.source, &key.column_id),
                target: key_side(tables.target, indexes.target, &key.column_id),
            });
        }

        rows
    }

    fn column_side(&self, table: &Table, column: &Column, target_side: bool) -> ColumnSide {
        let data_type = match (target_side, self.type_maps) {
            (true, Some(maps)) => maps.display_name(self.dialect, &column.data_type.name),
            _ => column.data_type.name.clone(),
        };

        ColumnSide {
            position: table.column_position(&column.id).unwrap_or_default(),
            name: column.name.clone(),
            data_type,
            is_array: column.data_type.is_array,
            max_length: column.data_type.length,
            is_primary_key: table.is_primary_key_column(&column.id),
            not_null: column.not_null,
            auto_gen: column.auto_gen.as_ref().map(|a| a.to_string()),
            default_value: column.default_value.clone(),
        }
    }
}

fn foreign_key_side(schema: &DatabaseSchema, table: &Table, fk: &ForeignKey) -> ForeignKeySide {
    let refer_table = schema.table(&fk.refer_table_id);
    let name_of = |t: Option<&Table>, id: &String| {
        t.and_then(|t| t.column_name(id)).unwrap_or_default().to_string()
    };

    ForeignKeySide {
        name: fk.name.clone(),
        columns: fk.column_ids.iter().map(|id| name_of(Some(table), id)).collect(),
        refer_table: refer_table.map(|t| t.name.clone()).unwrap_or_default(),
        refer_columns: fk.refer_column_ids.iter().map(|id| name_of(refer_table, id)).collect(),
        on_delete: fk.on_delete.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures;
    use pretty_assertions::assert_eq;

    fn names(rows: &[ColumnRow]) -> Vec<(Option<String>, Option<String>)> {
        rows.iter()
            .map(|r| {
                (
                    r.source.as_ref().map(|s| s.name.clone()),
                    r.target.as_ref().map(|t| t.name.clone()),
                )
            })
            .collect()
    }

    #[test]
    fn resolve_reports_missing_halves_without_failing() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();

        let legacy = resolve("t4", &source.tables, &target.tables);
        assert!(legacy.is_deleted());

        let nothing: Counterpart<Table> = resolve("nope", &source.tables, &target.tables);
        assert_eq!(nothing, Counterpart::none());

        let idx = Correspondence::new(&source, &target).index("t1", "i3");
        assert!(idx.is_added());
    }

    #[test]
    fn column_mapping_keeps_source_order_then_target_additions() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let rows = Correspondence::new(&source, &target).column_mapping("t1");

        assert_eq!(
            names(&rows),
            vec![
                (Some("SingerId".into()), Some("SingerId".into())),
                (Some("FirstName".into()), Some("GivenName".into())),
                (Some("LastName".into()), Some("LastName".into())),
                (None, Some("CreatedAt".into())),
            ]
        );
        assert!(rows[1].is_renamed());
        assert_eq!(rows[3].target.as_ref().unwrap().position, 4);
        assert!(rows[0].source.as_ref().unwrap().is_primary_key);
        assert_eq!(rows[1].target.as_ref().unwrap().max_length, Some(1024));
    }

    #[test]
    fn column_count_covers_both_sides() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let correspondence = Correspondence::new(&source, &target);

        for table_id in target.tables.keys() {
            let src = &source.tables[table_id];
            let tgt = &target.tables[table_id];
            let target_only = tgt
                .column_ids
                .iter()
                .filter(|id| !src.column_defs.contains_key(*id))
                .count();

            let rows = correspondence.column_mapping(table_id);
            assert_eq!(rows.len(), src.column_ids.len() + target_only);
            let leading: Vec<&ObjectId> =
                rows.iter().take(src.column_ids.len()).map(|r| &r.column_id).collect();
            assert_eq!(leading, src.column_ids.iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn deleted_table_reports_only_source_columns() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let rows = Correspondence::new(&source, &target).column_mapping("t4");

        assert_eq!(rows.len(), 1);
        assert!(rows[0].source.is_some());
        assert!(rows[0].target.is_none());
    }

    #[test]
    fn target_types_are_translated_for_postgres() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let maps = DialectTypeMaps::default();
        let rows = Correspondence::new(&source, &target)
            .with_dialect(Dialect::Postgresql, &maps)
            .column_mapping("t1");

        assert_eq!(rows[0].source.as_ref().unwrap().data_type, "INT64");
        assert_eq!(rows[0].target.as_ref().unwrap().data_type, "INT8");
        assert_eq!(rows[3].target.as_ref().unwrap().data_type, "TIMESTAMPTZ");
    }

    #[test]
    fn missing_target_foreign_key_renders_empty_target() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let rows = Correspondence::new(&source, &target).foreign_key_mapping("t2");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source.columns, vec!["SingerId"]);
        assert_eq!(rows[0].source.refer_table, "Singers");
        assert_eq!(rows[0].target.as_ref().unwrap().refer_columns, vec!["SingerId"]);
        assert_eq!(rows[1].source.refer_columns, vec!["FirstName"]);
        assert!(rows[1].target.is_none());
    }

    #[test]
    fn index_mapping_unions_key_columns() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let rows = Correspondence::new(&source, &target).index_mapping("t1", "i1");

        let ids: Vec<&str> = rows.iter().map(|r| r.column_id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c3", "c12"]);

        assert_eq!(rows[0].source.as_ref().unwrap().column_name, "FirstName");
        assert_eq!(rows[0].target.as_ref().unwrap().column_name, "GivenName");
        assert!(rows[1].target.is_none());
        assert!(rows[2].source.is_none());
        assert!(rows[2].target.as_ref().unwrap().desc);
    }

    #[test]
    fn unknown_table_yields_empty_mappings() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let correspondence = Correspondence::new(&source, &target);

        assert!(correspondence.column_mapping("missing").is_empty());
        assert!(correspondence.foreign_key_mapping("missing").is_empty());
        assert!(correspondence.index_mapping("missing", "i1").is_empty());
    }

    #[test]
    fn mappings_are_stable_across_calls() {
        let source = fixtures::source_schema();
        let target = fixtures::target_schema();
        let maps = DialectTypeMaps::default();
        let correspondence = Correspondence::new(&source, &target).with_dialect(Dialect::Postgresql, &maps);

        for table_id in source.tables.keys() {
            assert_eq!(correspondence.column_mapping(table_id), correspondence.column_mapping(table_id));
            assert_eq!(
                correspondence.foreign_key_mapping(table_id),
                correspondence.foreign_key_mapping(table_id)
            );
        }
        assert_eq!(correspondence.index_mapping("t1", "i1"), correspondence.index_mapping("t1", "i1"));
    }
}
