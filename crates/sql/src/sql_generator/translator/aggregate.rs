use super::StepGenerator;
use crate::sql_generator::dialect::AggregateFunction;
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::quote;
use crate::transform::GroupAggregate;

/// `<AGG>("<arg>")`, with `COUNT(*)` as the one unquoted form.
pub fn aggregate_fn(name: &str, arg: &str) -> Result<String, SqlGenError> {
    let func = AggregateFunction::parse(name)?;
    if func == AggregateFunction::Count && arg == "*" {
        return Ok("COUNT(*)".to_string());
    }
    Ok(format!("{}({})", func.as_sql(), quote(arg)?))
}

pub fn group_by_clause<S: AsRef<str>>(columns: &[S]) -> Result<String, SqlGenError> {
    if columns.is_empty() {
        return Ok(String::new());
    }
    let quoted = columns
        .iter()
        .map(|c| quote(c.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("GROUP BY {}", quoted.join(", ")))
}

pub fn having_clause(condition: Option<&str>) -> String {
    match condition.map(str::trim) {
        Some(text) if !text.is_empty() => format!("HAVING {}", text),
        _ => String::new(),
    }
}

pub(crate) fn handle_group(
    gen: &StepGenerator,
    group: &GroupAggregate,
) -> Result<String, SqlGenError> {
    let mut items = group
        .keys
        .iter()
        .map(|k| quote(k))
        .collect::<Result<Vec<_>, _>>()?;
    for (name, expr) in &group.aggregates {
        items.push(format!("{} AS {}", expr, quote(name)?));
    }

    let mut sql = format!(
        "SELECT {} {}",
        items.join(", "),
        gen.from_fragment(&group.source)?
    );
    let group_by = group_by_clause(&group.keys)?;
    if !group_by.is_empty() {
        sql.push(' ');
        sql.push_str(&group_by);
    }
    Ok(sql)
}
