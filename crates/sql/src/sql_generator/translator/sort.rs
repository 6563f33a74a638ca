use crate::sql_generator::dialect::SortDirection;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::quote;

/// `ORDER BY "a" ASC, "b" DESC`; empty input renders nothing.
pub fn order_by_clause<C: AsRef<str>, D: AsRef<str>>(
    orderings: &[(C, D)],
) -> Result<String, SqlGenError> {
    let items = orderings
        .iter()
        .map(|(column, direction)| -> Result<(String, SortDirection), SqlGenError> {
            let direction = SortDirection::parse(direction.as_ref())?;
            Ok((quote(column.as_ref())?, direction))
        })
        .collect::<Result<Vec<_>, SqlGenError>>()?;
    Ok(render_order_by(&items))
}

/// Columns are emitted as given.
pub(crate) fn render_order_by(items: &[(String, SortDirection)]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let rendered = items
        .iter()
        .map(|(column, direction)| format!("{} {}", column, direction.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("ORDER BY {}", rendered)
}

/// Non-positive values are treated as absent.
pub fn limit_offset(limit: Option<i64>, offset: Option<i64>) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(n) = limit.filter(|n| *n > 0) {
        parts.push(format!("LIMIT {}", n));
    }
    if let Some(n) = offset.filter(|n| *n > 0) {
        parts.push(format!("OFFSET {}", n));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_clause() {
        assert_eq!(order_by_clause::<&str, &str>(&[]).unwrap(), "");
        assert_eq!(
            order_by_clause(&[("age", "desc"), ("name", "Asc")]).unwrap(),
            "ORDER BY \"age\" DESC, \"name\" ASC"
        );
        assert!(matches!(
            order_by_clause(&[("age", "sideways")]),
            Err(SqlGenError::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_limit_offset() {
        assert_eq!(limit_offset(Some(10), Some(5)), "LIMIT 10 OFFSET 5");
        assert_eq!(limit_offset(Some(10), None), "LIMIT 10");
        assert_eq!(limit_offset(None, Some(5)), "OFFSET 5");
        assert_eq!(limit_offset(Some(0), Some(-1)), "");
        assert_eq!(limit_offset(None, None), "");
    }
}
