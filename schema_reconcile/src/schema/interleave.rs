//! Interleaving topology of the target schema
//!
//! `ParentId` pointers form a forest. A `ParentId` naming a table that does not
//! exist is treated as no parent, and a revisited table ends the ancestor walk,
//! so malformed input never loops.

use std::collections::{HashMap, HashSet};

use crate::schema::types::{DatabaseSchema, ObjectId, Table};

/// Parent and child lookups over one target schema
#[derive(Debug, Clone)]
pub struct InterleaveTopology<'a> {
    schema: &'a DatabaseSchema,
    children: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> InterleaveTopology<'a> {
    pub fn new(schema: &'a DatabaseSchema) -> Self {
        let mut children: HashMap<&'a str, Vec<&'a str>> = HashMap::new();

        for table in schema.tables.values() {
            if let Some(parent_id) = table.parent_id.as_deref() {
                if parent_id != table.id && schema.tables.contains_key(parent_id) {
                    children.entry(parent_id).or_default().push(table.id.as_str());
                }
            }
        }

        Self { schema, children }
    }

    /// Parent table, if `table_id` is interleaved in an existing table
    pub fn parent(&self, table_id: &str) -> Option<&'a Table> {
        let table = self.schema.tables.get(table_id)?;
        let parent_id = table.parent_id.as_deref()?;
        if parent_id == table_id {
            return None;
        }
        self.schema.tables.get(parent_id)
    }

    /// Ancestor chain, nearest first
    pub fn ancestors(&self, table_id: &str) -> Vec<&'a str> {
        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(table_id);

        let mut current = table_id;
        while let Some(parent) = self.parent(current) {
            if !visited.insert(parent.id.as_str()) {
                tracing::warn!(table_id, revisited = %parent.id, "Cycle in interleave parents");
                break;
            }
            chain.push(parent.id.as_str());
            current = parent.id.as_str();
        }

        chain
    }

    /// Tables interleaved directly in `table_id`, in schema order
    pub fn children(&self, table_id: &str) -> Vec<&'a str> {
        self.children.get(table_id).cloned().unwrap_or_default()
    }

    /// Whether `child_id` names `parent_id` as its parent
    pub fn is_parent_of(&self, parent_id: &str, child_id: &str) -> bool {
        self.parent(child_id).map_or(false, |p| p.id == parent_id)
    }

    /// The ancestor chain plus direct children; grandchildren are not included.
    /// Empty when the table takes part in no interleaving.
    pub fn peers(&self, table_id: &str) -> Vec<&'a str> {
        let mut peers = self.ancestors(table_id);
        for child in self.children(table_id) {
            if child != table_id && !peers.contains(&child) {
                peers.push(child);
            }
        }
        peers
    }
}

/// Ids of the tables `table_id` is interleaved with
pub fn interleave_peers(table_id: &str, target: &DatabaseSchema) -> Vec<ObjectId> {
    InterleaveTopology::new(target)
        .peers(table_id)
        .into_iter()
        .map(str::to_string)
        .collect()
}
