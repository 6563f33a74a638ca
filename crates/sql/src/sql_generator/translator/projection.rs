use super::StepGenerator;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::quote;
use crate::transform::{ColumnAddition, ColumnProjection, ColumnRename};

/// `SELECT "a", "b"`, or `SELECT *` for an empty list.
pub fn select_clause<S: AsRef<str>>(columns: &[S]) -> Result<String, SqlGenError> {
    if columns.is_empty() {
        return Ok("SELECT *".to_string());
    }
    let quoted = columns
        .iter()
        .map(|c| quote(c.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("SELECT {}", quoted.join(", ")))
}

/// Like [`select_clause`] but for items that are already rendered SQL.
pub fn projection_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "SELECT *".to_string();
    }
    let joined = items
        .iter()
        .map(|i| i.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {}", joined)
}

/// First occurrence wins.
pub(crate) fn dedup_columns(columns: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for c in columns {
        if !out.contains(c) {
            out.push(c.clone());
        }
    }
    out
}

pub(crate) fn handle_projection(
    gen: &StepGenerator,
    projection: &ColumnProjection,
) -> Result<String, SqlGenError> {
    let select = select_clause(&dedup_columns(&projection.columns))?;
    Ok(format!("{} {}", select, gen.from_fragment(&projection.source)?))
}

pub(crate) fn handle_addition(
    gen: &StepGenerator,
    addition: &ColumnAddition,
) -> Result<String, SqlGenError> {
    Ok(format!(
        "SELECT *, {} AS {} {}",
        addition.expression,
        quote(&addition.name)?,
        gen.from_fragment(&addition.source)?
    ))
}

pub(crate) fn handle_rename(
    gen: &StepGenerator,
    rename: &ColumnRename,
) -> Result<String, SqlGenError> {
    let columns = gen.output_columns(&rename.source)?;

    for (old, _) in &rename.mapping {
        if !columns.contains(old) {
            return Err(SqlGenError::FieldNotFound {
                column: old.clone(),
                relation: rename.source.to_string(),
                available: columns,
            });
        }
    }

    let items = columns
        .iter()
        .map(|c| match rename.mapping.iter().find(|(old, _)| old == c) {
            Some((old, new)) => Ok(format!("{} AS {}", quote(old)?, quote(new)?)),
            None => quote(c),
        })
        .collect::<Result<Vec<_>, SqlGenError>>()?;

    Ok(format!(
        "{} {}",
        projection_list(&items),
        gen.from_fragment(&rename.source)?
    ))
}
