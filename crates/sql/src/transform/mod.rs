//! Transform AST.
//!
//! Each node describes one table transformation step. Nodes are pushed into a
//! [`TransformArena`] bottom-up and never mutated afterwards; a node refers to
//! its input either by table name or by the [`NodeId`] of an earlier node, so
//! the graph is acyclic by construction.

mod explain;

pub use explain::explain_step;

use crate::sql_generator::dialect::JoinKind;
use crate::sql_generator::error::SqlGenError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Input of a transform step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TableRef {
    Named(String),
    Derived(NodeId),
}

impl TableRef {
    pub fn as_named(&self) -> Option<&str> {
        match self {
            TableRef::Named(name) => Some(name),
            TableRef::Derived(_) => None,
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Named(name) => f.write_str(name),
            TableRef::Derived(id) => write!(f, "<derived {}>", id),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::Named(name.to_string())
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::Named(name)
    }
}

impl From<NodeId> for TableRef {
    fn from(id: NodeId) -> Self {
        TableRef::Derived(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFilter {
    pub source: TableRef,
    pub predicate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProjection {
    pub source: TableRef,
    /// May repeat; duplicates are dropped when the step is emitted.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnAddition {
    pub source: TableRef,
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRename {
    pub source: TableRef,
    /// old name -> new name, insertion ordered, keys unique
    pub mapping: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAggregate {
    pub source: TableRef,
    pub keys: Vec<String>,
    /// output name -> aggregate expression text, insertion ordered, keys unique
    pub aggregates: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    pub left: TableRef,
    pub right: TableRef,
    /// left column -> right column
    pub on: Vec<(String, String)>,
    pub kind: JoinKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pivot {
    pub source: TableRef,
    pub pivot_column: String,
    pub value_column: String,
    pub aggregate: String,
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unpivot {
    pub source: TableRef,
    pub columns: Vec<String>,
    pub attribute_column: String,
    pub value_column: String,
}

/// Forces materialization of `source`; generated SQL never folds through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Buffer {
    pub source: TableRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransformNode {
    RowFilter(RowFilter),
    ColumnProjection(ColumnProjection),
    ColumnAddition(ColumnAddition),
    ColumnRename(ColumnRename),
    GroupAggregate(GroupAggregate),
    Join(Join),
    Pivot(Pivot),
    Unpivot(Unpivot),
    Buffer(Buffer),
}

impl TransformNode {
    pub fn sources(&self) -> Vec<&TableRef> {
        match self {
            TransformNode::RowFilter(n) => vec![&n.source],
            TransformNode::ColumnProjection(n) => vec![&n.source],
            TransformNode::ColumnAddition(n) => vec![&n.source],
            TransformNode::ColumnRename(n) => vec![&n.source],
            TransformNode::GroupAggregate(n) => vec![&n.source],
            TransformNode::Join(n) => vec![&n.left, &n.right],
            TransformNode::Pivot(n) => vec![&n.source],
            TransformNode::Unpivot(n) => vec![&n.source],
            TransformNode::Buffer(n) => vec![&n.source],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TransformNode::RowFilter(_) => "RowFilter",
            TransformNode::ColumnProjection(_) => "ColumnProjection",
            TransformNode::ColumnAddition(_) => "ColumnAddition",
            TransformNode::ColumnRename(_) => "ColumnRename",
            TransformNode::GroupAggregate(_) => "GroupAggregate",
            TransformNode::Join(_) => "Join",
            TransformNode::Pivot(_) => "Pivot",
            TransformNode::Unpivot(_) => "Unpivot",
            TransformNode::Buffer(_) => "Buffer",
        }
    }
}

macro_rules! impl_into_node {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for TransformNode {
                fn from(node: $variant) -> Self {
                    TransformNode::$variant(node)
                }
            }
        )*
    };
}

impl_into_node!(
    RowFilter,
    ColumnProjection,
    ColumnAddition,
    ColumnRename,
    GroupAggregate,
    Join,
    Pivot,
    Unpivot,
    Buffer
);

/// Append-only store of transform steps.
#[derive(Debug, Clone, Default)]
pub struct TransformArena {
    nodes: Vec<TransformNode>,
}

impl TransformArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step. Every derived source must already be in the arena.
    pub fn push(&mut self, node: impl Into<TransformNode>) -> Result<NodeId, SqlGenError> {
        let node = node.into();
        for source in node.sources() {
            if let TableRef::Derived(id) = source {
                if id.0 >= self.nodes.len() {
                    return Err(SqlGenError::UnknownNode(id.0));
                }
            }
        }
        let id = NodeId(self.nodes.len());
        tracing::trace!(target: "transform", step = %id, kind = node.kind_name(), "Pushed transform step");
        self.nodes.push(node);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Result<&TransformNode, SqlGenError> {
        self.nodes.get(id.0).ok_or(SqlGenError::UnknownNode(id.0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TransformNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Buffer steps reachable from `id`, innermost first.
    pub fn buffers_under(&self, id: NodeId) -> Result<Vec<NodeId>, SqlGenError> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        self.collect_buffers(id, &mut found, &mut seen)?;
        Ok(found)
    }

    fn collect_buffers(
        &self,
        id: NodeId,
        found: &mut Vec<NodeId>,
        seen: &mut HashSet<NodeId>,
    ) -> Result<(), SqlGenError> {
        if !seen.insert(id) {
            return Ok(());
        }
        let node = self.get(id)?;
        for source in node.sources() {
            if let TableRef::Derived(child) = source {
                self.collect_buffers(*child, found, seen)?;
            }
        }
        if matches!(node, TransformNode::Buffer(_)) {
            found.push(id);
        }
        Ok(())
    }

    pub fn row_filter(
        &mut self,
        source: impl Into<TableRef>,
        predicate: impl Into<String>,
    ) -> Result<NodeId, SqlGenError> {
        self.push(RowFilter {
            source: source.into(),
            predicate: predicate.into(),
        })
    }

    pub fn select_columns<S: Into<String>>(
        &mut self,
        source: impl Into<TableRef>,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<NodeId, SqlGenError> {
        self.push(ColumnProjection {
            source: source.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        })
    }

    pub fn add_column(
        &mut self,
        source: impl Into<TableRef>,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<NodeId, SqlGenError> {
        self.push(ColumnAddition {
            source: source.into(),
            name: name.into(),
            expression: expression.into(),
        })
    }

    pub fn rename_columns<K: Into<String>, V: Into<String>>(
        &mut self,
        source: impl Into<TableRef>,
        mapping: impl IntoIterator<Item = (K, V)>,
    ) -> Result<NodeId, SqlGenError> {
        let mapping = unique_pairs(mapping, "rename mapping")?;
        self.push(ColumnRename {
            source: source.into(),
            mapping,
        })
    }

    pub fn group<K: Into<String>, A: Into<String>, E: Into<String>>(
        &mut self,
        source: impl Into<TableRef>,
        keys: impl IntoIterator<Item = K>,
        aggregates: impl IntoIterator<Item = (A, E)>,
    ) -> Result<NodeId, SqlGenError> {
        let aggregates = unique_pairs(aggregates, "aggregate outputs")?;
        self.push(GroupAggregate {
            source: source.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            aggregates,
        })
    }

    pub fn join<L: Into<String>, R: Into<String>>(
        &mut self,
        left: impl Into<TableRef>,
        right: impl Into<TableRef>,
        on: impl IntoIterator<Item = (L, R)>,
        kind: JoinKind,
    ) -> Result<NodeId, SqlGenError> {
        let on = unique_pairs(on, "join columns")?;
        self.push(Join {
            left: left.into(),
            right: right.into(),
            on,
            kind,
        })
    }

    pub fn pivot<S: Into<String>>(
        &mut self,
        source: impl Into<TableRef>,
        pivot_column: impl Into<String>,
        value_column: impl Into<String>,
        aggregate: impl Into<String>,
        values: Option<Vec<S>>,
    ) -> Result<NodeId, SqlGenError> {
        self.push(Pivot {
            source: source.into(),
            pivot_column: pivot_column.into(),
            value_column: value_column.into(),
            aggregate: aggregate.into(),
            values: values.map(|v| v.into_iter().map(Into::into).collect()),
        })
    }

    pub fn unpivot<S: Into<String>>(
        &mut self,
        source: impl Into<TableRef>,
        columns: impl IntoIterator<Item = S>,
        attribute_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> Result<NodeId, SqlGenError> {
        self.push(Unpivot {
            source: source.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            attribute_column: attribute_column.into(),
            value_column: value_column.into(),
        })
    }

    pub fn buffer(&mut self, source: impl Into<TableRef>) -> Result<NodeId, SqlGenError> {
        self.push(Buffer {
            source: source.into(),
        })
    }
}

fn unique_pairs<K: Into<String>, V: Into<String>>(
    pairs: impl IntoIterator<Item = (K, V)>,
    what: &str,
) -> Result<Vec<(String, String)>, SqlGenError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (k, v) in pairs {
        let k = k.into();
        if !seen.insert(k.clone()) {
            return Err(SqlGenError::InvalidArgument(format!(
                "duplicate key '{}' in {}",
                k, what
            )));
        }
        out.push((k, v.into()));
    }
    Ok(out)
}
