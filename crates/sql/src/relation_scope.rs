//! Column ambiguity resolution.
//!
//! Given the relations of a [`JoinContext`], decide which relation an
//! unqualified column name belongs to. Only bare identifiers are touched;
//! qualified names, expressions, quoted names and wildcards pass through.

use crate::sql_generator::context::JoinContext;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::{quote, quote_qualified};
use duckquery_common::config::AmbiguityPolicy;

/// True for entries the resolver rewrites.
pub fn is_bare_column(entry: &str) -> bool {
    !entry.is_empty()
        && !entry
            .chars()
            .any(|c| matches!(c, '.' | '(' | ')' | '"' | '*') || c.is_whitespace())
}

/// Resolves one select-list entry against `context`.
///
/// - present in the working table and in a registered table: qualified with
///   the working alias
/// - present only in registered tables: qualified with the first of them in
///   registration order (or [`SqlGenError::AmbiguousColumn`] under
///   [`AmbiguityPolicy::Error`] when more than one holds it)
/// - otherwise: quoted, unqualified
///
/// Empty or whitespace-only entries are rejected with
/// [`SqlGenError::InvalidIdentifier`].
pub fn resolve_column(context: &JoinContext, entry: &str) -> Result<String, SqlGenError> {
    if entry.trim().is_empty() {
        return Err(SqlGenError::InvalidIdentifier(format!(
            "column entry cannot be empty (got {:?})",
            entry
        )));
    }
    if !is_bare_column(entry) {
        return Ok(entry.to_string());
    }

    let in_working = context.working().contains(entry);
    let owners = context.owners_of(entry);

    let resolved = match (in_working, owners.first()) {
        (true, Some(_)) => quote_qualified(context.working_alias(), entry)?,
        (false, Some(first)) => {
            if owners.len() > 1 && context.policy() == AmbiguityPolicy::Error {
                return Err(SqlGenError::AmbiguousColumn {
                    name: entry.to_string(),
                    candidates: owners.iter().map(|o| o.to_string()).collect(),
                });
            }
            quote_qualified(first, entry)?
        }
        (_, None) => quote(entry)?,
    };

    tracing::trace!(
        target: "sql_generator",
        column = %entry,
        resolved = %resolved,
        "Resolved column reference"
    );
    Ok(resolved)
}

pub fn resolve_columns(
    context: &JoinContext,
    entries: &[String],
) -> Result<Vec<String>, SqlGenError> {
    entries.iter().map(|e| resolve_column(context, e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_context() -> JoinContext {
        let mut ctx = JoinContext::new("current_df", ["id", "name", "dept_id"]);
        ctx.register("dept", ["id", "dept_name"]);
        ctx
    }

    #[test]
    fn test_shared_column_prefers_working_table() {
        let ctx = employee_context();
        assert_eq!(resolve_column(&ctx, "id").unwrap(), "current_df.\"id\"");
    }

    #[test]
    fn test_registered_only_column() {
        let ctx = employee_context();
        assert_eq!(
            resolve_column(&ctx, "dept_name").unwrap(),
            "dept.\"dept_name\""
        );
    }

    #[test]
    fn test_working_only_and_unknown_columns() {
        let ctx = employee_context();
        assert_eq!(resolve_column(&ctx, "name").unwrap(), "\"name\"");
        assert_eq!(resolve_column(&ctx, "missing").unwrap(), "\"missing\"");
    }

    #[test]
    fn test_passthrough_entries() {
        let ctx = employee_context();
        for entry in [
            "dept.id",
            "COUNT(*)",
            "count(id)",
            "salary * 2",
            "\"id\"",
            "*",
            "id as ident",
        ] {
            assert_eq!(resolve_column(&ctx, entry).unwrap(), entry);
        }
    }

    #[test]
    fn test_blank_entries_rejected() {
        let ctx = employee_context();
        for entry in ["", "   ", "\t"] {
            assert!(matches!(
                resolve_column(&ctx, entry),
                Err(SqlGenError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut ctx = JoinContext::new("current_df", ["id"]);
        ctx.register("b", ["code"]).register("a", ["code"]);
        assert_eq!(resolve_column(&ctx, "code").unwrap(), "b.\"code\"");
    }

    #[test]
    fn test_error_policy() {
        let mut ctx = JoinContext::new("current_df", ["id"]).with_policy(AmbiguityPolicy::Error);
        ctx.register("b", ["code", "id"]).register("a", ["code", "id"]);

        match resolve_column(&ctx, "code") {
            Err(SqlGenError::AmbiguousColumn { name, candidates }) => {
                assert_eq!(name, "code");
                assert_eq!(candidates, vec!["b", "a"]);
            }
            other => panic!("expected ambiguity error, got {:?}", other),
        }
        // the working table still settles shared names
        assert_eq!(resolve_column(&ctx, "id").unwrap(), "current_df.\"id\"");
    }

    #[test]
    fn test_non_plain_alias_is_quoted() {
        let mut ctx = JoinContext::new("current_df", ["id"]);
        ctx.register("my dept", ["dept_name"]);
        assert_eq!(
            resolve_column(&ctx, "dept_name").unwrap(),
            "\"my dept\".\"dept_name\""
        );
    }
}
