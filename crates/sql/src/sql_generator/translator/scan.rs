use super::StepGenerator;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::{quote, quote_relation};
use crate::transform::{Buffer, NodeId, RowFilter};

/// `FROM "<table>"`
pub fn from_clause(table: &str) -> Result<String, SqlGenError> {
    Ok(format!("FROM {}", quote_relation(table)?))
}

/// Predicates are trusted SQL text and are joined verbatim.
pub fn where_clause<S: AsRef<str>>(conditions: &[S]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let joined = conditions
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" AND ");
    format!("WHERE {}", joined)
}

pub(crate) fn handle_filter(
    gen: &StepGenerator,
    filter: &RowFilter,
) -> Result<String, SqlGenError> {
    let from = gen.from_fragment(&filter.source)?;
    Ok(format!(
        "SELECT * {} {}",
        from,
        where_clause(&[filter.predicate.as_str()])
    ))
}

pub(crate) fn handle_buffer(
    gen: &StepGenerator,
    id: NodeId,
    _buffer: &Buffer,
) -> Result<String, SqlGenError> {
    let table = gen
        .materialized_name(id)
        .ok_or(SqlGenError::Unmaterialized(id.index()))?;
    Ok(format!("SELECT * FROM {}", quote(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_clause() {
        assert_eq!(from_clause("users").unwrap(), "FROM \"users\"");
        assert!(matches!(
            from_clause(""),
            Err(SqlGenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_where_clause() {
        assert_eq!(where_clause::<&str>(&[]), "");
        assert_eq!(where_clause(&["age > 30"]), "WHERE age > 30");
        assert_eq!(
            where_clause(&["age > 30", "dept = 'IT'"]),
            "WHERE age > 30 AND dept = 'IT'"
        );
    }
}
