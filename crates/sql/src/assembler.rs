//! Query assembly.
//!
//! Structured mode renders a [`StructuredQuery`] against the working table of
//! a [`JoinContext`]; step mode renders one node of a [`TransformArena`].

use crate::relation_scope::{resolve_column, resolve_columns};
use crate::sql_generator::context::JoinContext;
use crate::sql_generator::dialect::SortDirection;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::translator::sort::render_order_by;
use crate::sql_generator::translator::{
    from_clause, having_clause, join_spec_clause, limit_offset, projection_list, where_clause,
    JoinSpec, StepGenerator,
};
use crate::transform::{NodeId, TransformArena};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clause-by-clause description of a query over the working table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredQuery {
    pub select: Vec<String>,
    #[serde(rename = "where")]
    pub where_: Vec<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    /// (column, direction) pairs
    pub order_by: Vec<(String, String)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub joins: Vec<JoinSpec>,
}

impl StructuredQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.where_.push(condition.into());
        self
    }

    pub fn join(mut self, spec: JoinSpec) -> Self {
        self.joins.push(spec);
        self
    }

    pub fn group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn having(mut self, condition: impl Into<String>) -> Self {
        self.having = Some(condition.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_by.push((column.into(), direction.into()));
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }
}

pub struct QueryAssembler<'a> {
    context: &'a JoinContext,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(context: &'a JoinContext) -> Self {
        Self { context }
    }

    /// Renders SELECT, FROM, JOIN*, WHERE, GROUP BY, HAVING, ORDER BY and
    /// LIMIT/OFFSET, single-space separated, skipping empty clauses.
    pub fn assemble(&self, query: &StructuredQuery) -> Result<String, SqlGenError> {
        let select = projection_list(&resolve_columns(self.context, &query.select)?);
        let from = from_clause(self.context.working_alias())?;
        let joins = query
            .joins
            .iter()
            .map(join_spec_clause)
            .collect::<Result<Vec<_>, _>>()?;

        let group_keys = resolve_columns(self.context, &query.group_by)?;
        let group_by = if group_keys.is_empty() {
            String::new()
        } else {
            format!("GROUP BY {}", group_keys.join(", "))
        };

        let orderings = query
            .order_by
            .iter()
            .map(|(column, direction)| -> Result<(String, SortDirection), SqlGenError> {
                Ok((
                    resolve_column(self.context, column)?,
                    SortDirection::parse(direction)?,
                ))
            })
            .collect::<Result<Vec<_>, SqlGenError>>()?;

        let clauses = std::iter::once(select)
            .chain(std::iter::once(from))
            .chain(joins)
            .chain([
                where_clause(&query.where_),
                group_by,
                having_clause(query.having.as_deref()),
                render_order_by(&orderings),
                limit_offset(query.limit, query.offset),
            ]);

        let sql = clauses
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(target: "sql_generator", sql = %sql, "Assembled structured query");
        Ok(sql)
    }

    /// Renders one transform step. `materialized` maps buffer steps to the
    /// tables holding their results.
    pub fn assemble_step(
        &self,
        arena: &TransformArena,
        id: NodeId,
        materialized: &HashMap<NodeId, String>,
    ) -> Result<String, SqlGenError> {
        let generator = materialized
            .iter()
            .fold(StepGenerator::new(arena, self.context), |gen, (buffer, table)| {
                gen.with_materialized(*buffer, table.clone())
            });
        generator.generate(id)
    }
}
