//! Type definitions for schema objects
//!
//! Both sides of a conversion use the same records. Every object carries an
//! [`ObjectId`] assigned once at import time; the same id on both sides means
//! the two records describe the same object.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier shared by corresponding source and target objects
pub type ObjectId = String;

/// Anything addressable by its stable id
pub trait Identified {
    fn id(&self) -> &str;
}

/// One side of a conversion: the source schema or the target schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tables: IndexMap<ObjectId, Table>,
    /// Always empty on the source side
    #[serde(default)]
    pub sequences: IndexMap<ObjectId, Sequence>,
}

impl DatabaseSchema {
    /// Create a new empty schema
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a table to the schema, keyed by its id
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.id.clone(), table);
    }

    /// Add a sequence to the schema, keyed by its id
    pub fn add_sequence(&mut self, sequence: Sequence) {
        self.sequences.insert(sequence.id.clone(), sequence);
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.get(id)
    }

    /// Display name of a table, if it exists
    pub fn table_name(&self, id: &str) -> Option<&str> {
        self.tables.get(id).map(|t| t.name.as_str())
    }
}

/// Represents a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    pub id: ObjectId,
    pub name: String,
    /// Declaration order of the columns
    #[serde(default)]
    pub column_ids: Vec<ObjectId>,
    #[serde(default)]
    pub column_defs: IndexMap<ObjectId, Column>,
    #[serde(default)]
    pub primary_key: Vec<KeyPart>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub check_constraints: Vec<CheckConstraint>,
    /// Interleaving parent, target side only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
}

impl Table {
    /// Create a new table with the given id and name
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Append a column, keeping `column_ids` in declaration order
    pub fn add_column(&mut self, column: Column) {
        if !self.column_defs.contains_key(&column.id) {
            self.column_ids.push(column.id.clone());
        }
        self.column_defs.insert(column.id.clone(), column);
    }

    /// Add an index to the table
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Add a foreign key to the table
    pub fn add_foreign_key(&mut self, fk: ForeignKey) {
        self.foreign_keys.push(fk);
    }

    /// Primary key from column ids, ordered as given
    pub fn set_primary_key<S: AsRef<str>>(&mut self, column_ids: &[S]) {
        self.primary_key = column_ids
            .iter()
            .enumerate()
            .map(|(i, id)| KeyPart::new(id.as_ref(), i as u32 + 1))
            .collect();
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.column_defs.get(id)
    }

    /// Column name for an id, if the column exists on this table
    pub fn column_name(&self, id: &str) -> Option<&str> {
        self.column_defs.get(id).map(|c| c.name.as_str())
    }

    /// 1-based position of a column in declaration order
    pub fn column_position(&self, id: &str) -> Option<usize> {
        self.column_ids.iter().position(|c| c == id).map(|p| p + 1)
    }

    /// Primary key column ids sorted by key order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        let mut parts: Vec<&KeyPart> = self.primary_key.iter().collect();
        parts.sort_by_key(|p| p.order);
        parts.into_iter().map(|p| p.column_id.as_str()).collect()
    }

    pub fn is_primary_key_column(&self, id: &str) -> bool {
        self.primary_key.iter().any(|p| p.column_id == id)
    }

    pub fn index(&self, id: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.id == id)
    }
}

impl Identified for Table {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Represents a column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Column {
    pub id: ObjectId,
    pub name: String,
    #[serde(rename = "Type")]
    pub data_type: ColumnType,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_gen: Option<AutoGen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Column {
    /// Create a new nullable column with the given id, name and type name
    pub fn new(id: &str, name: &str, type_name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            data_type: ColumnType::named(type_name),
            ..Default::default()
        }
    }

    /// Set whether the column is NOT NULL
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Set the declared length
    pub fn length(mut self, length: i64) -> Self {
        self.data_type.length = Some(length);
        self
    }
}

impl Identified for Column {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Column data type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnType {
    pub name: String,
    #[serde(default, rename = "Len", alias = "Length")]
    pub length: Option<i64>,
    #[serde(default)]
    pub is_array: bool,
}

impl ColumnType {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            length: None,
            is_array: false,
        }
    }
}

/// Value generation attached to a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoGen {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub generation_type: String,
}

impl fmt::Display for AutoGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation_type.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.generation_type)
        }
    }
}

/// One column of a primary key or index key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyPart {
    #[serde(rename = "ColId")]
    pub column_id: ObjectId,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub desc: bool,
}

impl KeyPart {
    pub fn new(column_id: &str, order: u32) -> Self {
        Self {
            column_id: column_id.to_string(),
            order,
            desc: false,
        }
    }
}

/// Represents an index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Index {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub keys: Vec<KeyPart>,
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// Create an index keyed on the given column ids, ascending
    pub fn new<S: AsRef<str>>(id: &str, name: &str, column_ids: &[S]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            keys: column_ids
                .iter()
                .enumerate()
                .map(|(i, c)| KeyPart::new(c.as_ref(), i as u32 + 1))
                .collect(),
            unique: false,
        }
    }

    pub fn key(&self, column_id: &str) -> Option<&KeyPart> {
        self.keys.iter().find(|k| k.column_id == column_id)
    }
}

impl Identified for Index {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Represents a foreign key constraint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForeignKey {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub column_ids: Vec<ObjectId>,
    #[serde(default)]
    pub refer_table_id: ObjectId,
    #[serde(default)]
    pub refer_column_ids: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

impl ForeignKey {
    pub fn new<S: AsRef<str>>(
        id: &str,
        name: &str,
        column_ids: &[S],
        refer_table_id: &str,
        refer_column_ids: &[S],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            column_ids: column_ids.iter().map(|c| c.as_ref().to_string()).collect(),
            refer_table_id: refer_table_id.to_string(),
            refer_column_ids: refer_column_ids.iter().map(|c| c.as_ref().to_string()).collect(),
            on_delete: None,
            on_update: None,
        }
    }
}

impl Identified for ForeignKey {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Target-side sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sequence {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_range_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_range_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_with_counter: Option<i64>,
}

impl Sequence {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: "BIT_REVERSED_POSITIVE".to_string(),
            ..Default::default()
        }
    }
}

impl Identified for Sequence {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Represents a check constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckConstraint {
    pub id: ObjectId,
    pub name: String,
    #[serde(alias = "Expr")]
    pub expression: String,
}

impl CheckConstraint {
    pub fn new(id: &str, name: &str, expression: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            expression: expression.to_string(),
        }
    }
}

impl Identified for CheckConstraint {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Externally computed conversion quality of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    #[default]
    None,
    Excellent,
    Good,
    Ok,
    Bad,
}

/// Conversion rating per table id
pub type ConversionRateMap = IndexMap<ObjectId, Rating>;
