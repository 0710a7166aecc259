//! Presentation tree for one side of a conversion
//!
//! The tree is rebuilt from scratch on every call. Layout:
//!
//! ```text
//! <database>
//! ├── Tables
//! │   └── <table>            status = rating, or DELETED
//! │       └── Indexes (n)
//! │           └── <index>
//! └── Sequences              target side only
//!     └── <sequence>
//! ```
//!
//! The target tree is the superset view: source tables dropped from the
//! target and indexes dropped from surviving tables are listed too, flagged
//! with `is_deleted`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::schema::diff::{deleted_indexes, deleted_tables};
use crate::schema::store::SchemaSnapshot;
use crate::schema::types::{Index, ObjectId, Rating, Table};
use crate::utils::naming::contains_ignore_case;

/// Which schema a tree is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

/// Sibling ordering.
///
/// `Asc` is a stable sort by name, so equal names keep declaration order.
/// `Desc` is the exact reversal of `Asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc", alias = "")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortOrder {
    /// Parse the `'asc' | 'desc' | ''` vocabulary; only `desc` reverses
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Database,
    Tables,
    Table,
    Indexes,
    Index,
    Sequences,
    Sequence,
}

/// Per-object annotation shown next to a table node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    None,
    Excellent,
    Good,
    Ok,
    Bad,
    Deleted,
}

impl From<Rating> for NodeStatus {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::None => NodeStatus::None,
            Rating::Excellent => NodeStatus::Excellent,
            Rating::Good => NodeStatus::Good,
            Rating::Ok => NodeStatus::Ok,
            Rating::Bad => NodeStatus::Bad,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Owning table of an index node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    pub is_deleted: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn group(name: &str, kind: NodeKind, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            id: None,
            parent_id: None,
            status: None,
            is_deleted: false,
            children,
        }
    }

    fn leaf(name: &str, kind: NodeKind, id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::group(name, kind, Vec::new())
        }
    }

    /// Direct child of the given kind
    pub fn child(&self, kind: NodeKind) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Depth-first iterator over this node and all of its descendants
    pub fn walk(&self) -> Vec<&TreeNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

/// Build the tree for one side of `snapshot`.
///
/// `search_text` keeps only objects whose name contains it (ignoring case);
/// a table also stays when one of its indexes matches.
///
/// The database root and the `Tables`/`Sequences` collections are scaffold
/// and exempt from the filter: they are always present, even when nothing
/// below them matches. Every other node matches or has a matching descendant.
pub fn build_tree(snapshot: &SchemaSnapshot, side: Side, search_text: &str, sort: SortOrder) -> TreeNode {
    let schema = match side {
        Side::Source => &snapshot.source_schema,
        Side::Target => &snapshot.target_schema,
    };
    let searching = !search_text.is_empty();

    let dropped_indexes = match side {
        Side::Source => IndexMap::new(),
        Side::Target => deleted_indexes(&snapshot.source_schema, &snapshot.target_schema),
    };

    let mut tables: Vec<TreeNode> = schema
        .tables
        .values()
        .filter_map(|table| {
            let status = NodeStatus::from(snapshot.rating(&table.id));
            let dropped = dropped_indexes.get(&table.id).map(Vec::as_slice).unwrap_or_default();
            table_node(table, status, dropped, search_text)
        })
        .collect();

    if side == Side::Target {
        for table in deleted_tables(&snapshot.source_schema, &snapshot.target_schema) {
            if !contains_ignore_case(&table.name, search_text) {
                continue;
            }
            let mut node = TreeNode::leaf(&table.name, NodeKind::Table, &table.id);
            node.status = Some(NodeStatus::Deleted);
            node.is_deleted = true;
            tables.push(node);
        }
    }

    sort_nodes(&mut tables, sort);
    let mut children = vec![TreeNode::group("Tables", NodeKind::Tables, tables)];

    if side == Side::Target {
        let mut sequences: Vec<TreeNode> = schema
            .sequences
            .values()
            .filter(|seq| contains_ignore_case(&seq.name, search_text))
            .map(|seq| TreeNode::leaf(&seq.name, NodeKind::Sequence, &seq.id))
            .collect();
        sort_nodes(&mut sequences, sort);
        children.push(TreeNode::group("Sequences", NodeKind::Sequences, sequences));
    }

    let root = TreeNode::group(&schema.name, NodeKind::Database, children);
    tracing::debug!(
        ?side,
        searching,
        nodes = root.walk().len(),
        "Built schema tree"
    );
    root
}

/// Node for one surviving table, or `None` when filtered out.
///
/// `dropped` are indexes the source had and the target lost; they are
/// siblings of the surviving ones, told apart by `is_deleted`.
fn table_node(table: &Table, status: NodeStatus, dropped: &[Index], search_text: &str) -> Option<TreeNode> {
    let searching = !search_text.is_empty();
    let table_matches = contains_ignore_case(&table.name, search_text);

    let index_node = |index: &Index, is_deleted: bool| {
        let mut node = TreeNode::leaf(&index.name, NodeKind::Index, &index.id);
        node.parent_id = Some(table.id.clone());
        node.is_deleted = is_deleted;
        node
    };

    let mut surviving: Vec<TreeNode> = table
        .indexes
        .iter()
        .filter(|index| contains_ignore_case(&index.name, search_text))
        .map(|index| index_node(index, false))
        .collect();
    let mut deleted: Vec<TreeNode> = dropped
        .iter()
        .filter(|index| contains_ignore_case(&index.name, search_text))
        .map(|index| index_node(index, true))
        .collect();

    if !table_matches && surviving.is_empty() && deleted.is_empty() {
        return None;
    }

    let mut node = TreeNode::leaf(&table.name, NodeKind::Table, &table.id);
    node.status = Some(status);

    if !searching || !surviving.is_empty() || !deleted.is_empty() {
        // children are sorted later with the rest of the tree
        surviving.append(&mut deleted);
        let mut indexes = TreeNode::group(
            &format!("Indexes ({})", table.indexes.len()),
            NodeKind::Indexes,
            surviving,
        );
        indexes.parent_id = Some(table.id.clone());
        node.children.push(indexes);
    }

    Some(node)
}

fn compare_names(a: &TreeNode, b: &TreeNode) -> Ordering {
    a.name.cmp(&b.name)
}

/// Sort siblings, recursing into table nodes
fn sort_nodes(nodes: &mut [TreeNode], sort: SortOrder) {
    for node in nodes.iter_mut() {
        if node.kind == NodeKind::Table {
            for group in node.children.iter_mut() {
                sort_siblings(&mut group.children, sort);
            }
        }
    }
    sort_siblings(nodes, sort);
}

fn sort_siblings(nodes: &mut [TreeNode], sort: SortOrder) {
    nodes.sort_by(compare_names);
    if sort == SortOrder::Desc {
        nodes.reverse();
    }
}
