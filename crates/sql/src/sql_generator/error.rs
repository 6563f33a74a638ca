use duckquery_error::{closest_match, DuckQueryError, ErrorCode, ErrorContext};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlGenError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported aggregate function: {0}")]
    UnsupportedAggregate(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Pivot requires a non-empty 'values' list")]
    MissingValues,

    #[error("Unpivot requires a non-empty 'columns' list")]
    MissingColumns,

    #[error("Ambiguous column reference: {name}. Candidates: {candidates:?}")]
    AmbiguousColumn {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Column '{column}' not found in '{relation}'")]
    FieldNotFound {
        column: String,
        relation: String,
        available: Vec<String>,
    },

    #[error("Table '{0}' is not registered")]
    UnknownTable(String),

    #[error("Transform step #{0} does not exist")]
    UnknownNode(usize),

    #[error("Buffer step #{0} must be materialized before it can be referenced")]
    Unmaterialized(usize),
}

impl SqlGenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SqlGenError::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            SqlGenError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            SqlGenError::UnsupportedAggregate(_) => ErrorCode::UnsupportedAggregate,
            SqlGenError::InvalidDirection(_) => ErrorCode::InvalidDirection,
            SqlGenError::MissingValues => ErrorCode::MissingValues,
            SqlGenError::MissingColumns => ErrorCode::MissingColumns,
            SqlGenError::AmbiguousColumn { .. } => ErrorCode::AmbiguousColumn,
            SqlGenError::FieldNotFound { .. } => ErrorCode::FieldNotFound,
            SqlGenError::UnknownTable(_) => ErrorCode::TableNotFound,
            SqlGenError::UnknownNode(_) => ErrorCode::UnknownStep,
            SqlGenError::Unmaterialized(_) => ErrorCode::Unmaterialized,
        }
    }

    pub fn to_duckquery_error(&self) -> DuckQueryError {
        let err = DuckQueryError::new(self.code(), self.to_string());
        match self {
            SqlGenError::InvalidIdentifier(_) => {
                err.with_hint("Identifiers must be non-empty strings")
            }
            SqlGenError::UnsupportedAggregate(_) => {
                err.with_hint("Supported aggregates are SUM, COUNT, AVG, MIN and MAX")
            }
            SqlGenError::InvalidDirection(_) => err.with_hint("Use ASC or DESC"),
            SqlGenError::MissingValues => {
                err.with_hint("List the pivot values explicitly; columns are not discovered")
            }
            SqlGenError::AmbiguousColumn { name, candidates } => err
                .with_context(ErrorContext::AmbiguousColumn {
                    column: name.clone(),
                    candidates: candidates.clone(),
                })
                .with_hint("Qualify the column with a table name, e.g. table.column"),
            SqlGenError::FieldNotFound {
                column,
                relation,
                available,
            } => {
                let err = err.with_context(ErrorContext::FieldNotFound {
                    field: column.clone(),
                    table: Some(relation.clone()),
                    available_fields: available.clone(),
                });
                match closest_match(column, available) {
                    Some(closest) => err.with_hint(format!("Did you mean '{}'?", closest)),
                    None => err,
                }
            }
            SqlGenError::UnknownTable(table) => err.with_context(ErrorContext::TableNotFound {
                table: table.clone(),
                available_tables: Vec::new(),
            }),
            SqlGenError::Unmaterialized(_) => {
                err.with_hint("Run the step through a session so buffers are materialized first")
            }
            _ => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_not_found_hint() {
        let err = SqlGenError::FieldNotFound {
            column: "nmae".to_string(),
            relation: "current_df".to_string(),
            available: vec!["id".to_string(), "name".to_string()],
        };
        let dq = err.to_duckquery_error();
        assert_eq!(dq.code, ErrorCode::FieldNotFound);
        assert_eq!(dq.hint.as_deref(), Some("Did you mean 'name'?"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(SqlGenError::MissingValues.code(), ErrorCode::MissingValues);
        assert_eq!(SqlGenError::MissingColumns.code(), ErrorCode::MissingColumns);
        assert_eq!(
            SqlGenError::UnsupportedAggregate("median".into()).code(),
            ErrorCode::UnsupportedAggregate
        );
    }
}
