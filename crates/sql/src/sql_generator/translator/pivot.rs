use super::StepGenerator;
use crate::sql_generator::dialect::AggregateFunction;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::{quote, quote_literal};
use crate::sql_generator::translator::scan::from_clause;
use crate::transform::Pivot;

/// One conditional aggregate per value:
/// `SUM(CASE WHEN "region" = 'East' THEN "amount" END) AS "East"`.
fn pivot_items<S: AsRef<str>>(
    pivot_column: &str,
    value_column: &str,
    aggregate: &str,
    values: Option<&[S]>,
) -> Result<String, SqlGenError> {
    let values = match values {
        Some(v) if !v.is_empty() => v,
        _ => return Err(SqlGenError::MissingValues),
    };
    let func = AggregateFunction::parse(aggregate)?;

    let pivot = quote(pivot_column)?;
    let value = quote(value_column)?;
    let items = values
        .iter()
        .map(|v| -> Result<String, SqlGenError> {
            let v = v.as_ref();
            Ok(format!(
                "{}(CASE WHEN {} = {} THEN {} END) AS {}",
                func.as_sql(),
                pivot,
                quote_literal(v),
                value,
                quote(v)?
            ))
        })
        .collect::<Result<Vec<_>, SqlGenError>>()?;
    Ok(items.join(", "))
}

pub fn pivot_basic<S: AsRef<str>>(
    table: &str,
    pivot_column: &str,
    value_column: &str,
    aggregate: &str,
    values: Option<&[S]>,
) -> Result<String, SqlGenError> {
    let items = pivot_items(pivot_column, value_column, aggregate, values)?;
    Ok(format!("SELECT {} {}", items, from_clause(table)?))
}

pub(crate) fn handle_pivot(gen: &StepGenerator, pivot: &Pivot) -> Result<String, SqlGenError> {
    let items = pivot_items(
        &pivot.pivot_column,
        &pivot.value_column,
        &pivot.aggregate,
        pivot.values.as_deref(),
    )?;
    Ok(format!("SELECT {} {}", items, gen.from_fragment(&pivot.source)?))
}
