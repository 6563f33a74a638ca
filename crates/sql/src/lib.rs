//! SQL text synthesis for duckquery.
//!
//! This crate turns declarative query descriptions into SQL text:
//! - **Clause emitters**: pure fragment renderers (via `sql_generator::translator`).
//! - **Transform AST**: an append-only arena of table transformation steps (via `transform`).
//! - **Assembly**: structured queries and single steps rendered into one statement,
//!   with column ambiguity resolution across registered tables (via `assembler`).
//!
//! Nothing here talks to an engine; `duckquery-runtime` executes the output.
pub mod assembler;
pub mod normalize;
pub mod relation_scope;
pub mod sql_generator;
pub mod transform;

pub use assembler::{QueryAssembler, StructuredQuery};
pub use normalize::normalize_column_names;
pub use sql_generator::dialect::{AggregateFunction, JoinKind, SortDirection};
pub use sql_generator::error::SqlGenError;
pub use sql_generator::sanitize::{quote, quote_literal, quote_qualified};
pub use sql_generator::translator::{
    aggregate_fn, buffer_table_name, from_clause, group_by_clause, having_clause, join_clause,
    join_spec_clause, limit_offset, order_by_clause, pivot_basic, projection_list, select_clause,
    unpivot_basic, where_clause, JoinConstraint, JoinSpec,
};
pub use sql_generator::{JoinContext, StepGenerator};
pub use transform::{explain_step, NodeId, TableRef, TransformArena, TransformNode};
