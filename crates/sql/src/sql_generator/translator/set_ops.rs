use super::StepGenerator;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::{quote, quote_literal};
use crate::sql_generator::translator::scan::from_clause;
use crate::transform::Unpivot;

/// One `SELECT` per column, stacked with `UNION ALL`.
fn unpivot_branches<S: AsRef<str>>(
    from: &str,
    columns: &[S],
    attribute: &str,
    value: &str,
) -> Result<String, SqlGenError> {
    if columns.is_empty() {
        return Err(SqlGenError::MissingColumns);
    }
    let attribute = quote(attribute)?;
    let value = quote(value)?;
    let branches = columns
        .iter()
        .map(|c| -> Result<String, SqlGenError> {
            let c = c.as_ref();
            Ok(format!(
                "SELECT {} AS {}, {} AS {} {}",
                quote_literal(c),
                attribute,
                quote(c)?,
                value,
                from
            ))
        })
        .collect::<Result<Vec<_>, SqlGenError>>()?;
    Ok(branches.join(" UNION ALL "))
}

pub fn unpivot_basic<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    attribute: &str,
    value: &str,
) -> Result<String, SqlGenError> {
    if columns.is_empty() {
        return Err(SqlGenError::MissingColumns);
    }
    unpivot_branches(&from_clause(table)?, columns, attribute, value)
}

pub(crate) fn handle_unpivot(
    gen: &StepGenerator,
    unpivot: &Unpivot,
) -> Result<String, SqlGenError> {
    if unpivot.columns.is_empty() {
        return Err(SqlGenError::MissingColumns);
    }
    unpivot_branches(
        &gen.from_fragment(&unpivot.source)?,
        &unpivot.columns,
        &unpivot.attribute_column,
        &unpivot.value_column,
    )
}
