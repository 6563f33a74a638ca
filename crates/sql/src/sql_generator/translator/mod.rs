//! Clause emitters and the per-step SQL generator.
//!
//! The free functions (`select_clause`, `join_clause`, `pivot_basic`, ...)
//! render one fragment each. [`StepGenerator`] turns a node of a
//! [`TransformArena`] into a full statement, folding derived inputs into
//! aliased subqueries.

use crate::sql_generator::context::JoinContext;
use crate::sql_generator::dialect::JoinKind;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::{quote, quote_relation};
use crate::transform::{NodeId, TableRef, TransformArena, TransformNode};
use std::collections::HashMap;

pub(crate) mod aggregate;
pub(crate) mod join;
pub(crate) mod pivot;
pub(crate) mod projection;
pub(crate) mod scan;
pub(crate) mod set_ops;
pub(crate) mod sort;

pub use aggregate::{aggregate_fn, group_by_clause, having_clause};
pub use join::{join_clause, join_spec_clause, JoinConstraint, JoinSpec};
pub use pivot::pivot_basic;
pub use projection::{projection_list, select_clause};
pub use scan::{from_clause, where_clause};
pub use set_ops::unpivot_basic;
pub use sort::{limit_offset, order_by_clause};

/// Alias given to a folded derived input.
pub fn step_alias(id: NodeId) -> String {
    format!("step_{}", id.index())
}

/// Name a materialized buffer step is registered under.
pub fn buffer_table_name(id: NodeId) -> String {
    format!("buffer_{}", id.index())
}

pub struct StepGenerator<'a> {
    arena: &'a TransformArena,
    context: &'a JoinContext,
    materialized: HashMap<NodeId, String>,
}

impl<'a> StepGenerator<'a> {
    pub fn new(arena: &'a TransformArena, context: &'a JoinContext) -> Self {
        Self {
            arena,
            context,
            materialized: HashMap::new(),
        }
    }

    /// Marks a buffer step as available under `table`.
    pub fn with_materialized(mut self, id: NodeId, table: impl Into<String>) -> Self {
        self.materialized.insert(id, table.into());
        self
    }

    pub fn materialized_name(&self, id: NodeId) -> Option<&str> {
        self.materialized.get(&id).map(String::as_str)
    }

    pub fn generate(&self, id: NodeId) -> Result<String, SqlGenError> {
        let sql = match self.arena.get(id)? {
            TransformNode::RowFilter(n) => scan::handle_filter(self, n)?,
            TransformNode::ColumnProjection(n) => projection::handle_projection(self, n)?,
            TransformNode::ColumnAddition(n) => projection::handle_addition(self, n)?,
            TransformNode::ColumnRename(n) => projection::handle_rename(self, n)?,
            TransformNode::GroupAggregate(n) => aggregate::handle_group(self, n)?,
            TransformNode::Join(n) => join::handle_join(self, n)?,
            TransformNode::Pivot(n) => pivot::handle_pivot(self, n)?,
            TransformNode::Unpivot(n) => set_ops::handle_unpivot(self, n)?,
            TransformNode::Buffer(n) => scan::handle_buffer(self, id, n)?,
        };
        tracing::debug!(target: "sql_generator", step = %id, sql = %sql, "Generated step SQL");
        Ok(sql)
    }

    /// Relation text for FROM/JOIN position plus the label columns are
    /// qualified with.
    pub(crate) fn relation_fragment(
        &self,
        source: &TableRef,
    ) -> Result<(String, String), SqlGenError> {
        match source {
            TableRef::Named(name) => Ok((quote_relation(name)?, name.clone())),
            TableRef::Derived(id) => {
                if let TransformNode::Buffer(_) = self.arena.get(*id)? {
                    let table = self
                        .materialized_name(*id)
                        .ok_or(SqlGenError::Unmaterialized(id.index()))?;
                    return Ok((quote(table)?, table.to_string()));
                }
                let alias = step_alias(*id);
                Ok((
                    format!("({}) AS {}", self.generate(*id)?, quote(&alias)?),
                    alias,
                ))
            }
        }
    }

    pub(crate) fn from_fragment(&self, source: &TableRef) -> Result<String, SqlGenError> {
        let (relation, _) = self.relation_fragment(source)?;
        Ok(format!("FROM {}", relation))
    }

    /// Column names `source` produces, in order.
    pub fn output_columns(&self, source: &TableRef) -> Result<Vec<String>, SqlGenError> {
        match source {
            TableRef::Named(name) => self
                .context
                .columns_of(name)
                .map(<[String]>::to_vec)
                .ok_or_else(|| SqlGenError::UnknownTable(name.clone())),
            TableRef::Derived(id) => self.node_columns(*id),
        }
    }

    fn node_columns(&self, id: NodeId) -> Result<Vec<String>, SqlGenError> {
        let columns = match self.arena.get(id)? {
            TransformNode::RowFilter(n) => self.output_columns(&n.source)?,
            TransformNode::Buffer(n) => self.output_columns(&n.source)?,
            TransformNode::ColumnProjection(n) => projection::dedup_columns(&n.columns),
            TransformNode::ColumnAddition(n) => {
                let mut cols = self.output_columns(&n.source)?;
                cols.push(n.name.clone());
                cols
            }
            TransformNode::ColumnRename(n) => self
                .output_columns(&n.source)?
                .into_iter()
                .map(|c| {
                    n.mapping
                        .iter()
                        .find(|(old, _)| *old == c)
                        .map(|(_, new)| new.clone())
                        .unwrap_or(c)
                })
                .collect(),
            TransformNode::GroupAggregate(n) => n
                .keys
                .iter()
                .cloned()
                .chain(n.aggregates.iter().map(|(name, _)| name.clone()))
                .collect(),
            TransformNode::Join(n) => {
                let mut cols = self.output_columns(&n.left)?;
                if !matches!(n.kind, JoinKind::Semi | JoinKind::Anti) {
                    cols.extend(self.output_columns(&n.right)?);
                }
                cols
            }
            TransformNode::Pivot(n) => n.values.clone().unwrap_or_default(),
            TransformNode::Unpivot(n) => {
                vec![n.attribute_column.clone(), n.value_column.clone()]
            }
        };
        Ok(columns)
    }
}
