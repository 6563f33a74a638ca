use duckquery_error::{DuckQueryError, ErrorCode, ErrorContext};
use duckquery_sql::SqlGenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    SqlGen(#[from] SqlGenError),

    /// Engine text is kept as-is. `statement` is the failing SQL as it was
    /// logged (literals masked when scrubbing is on).
    #[error("{message}")]
    EngineExecution {
        message: String,
        statement: Option<String>,
    },

    #[error("Engine connection is closed")]
    ConnectionClosed,

    #[error("Column '{column}' has type {data_type}, which cannot be registered with the engine")]
    UnsupportedType { column: String, data_type: String },

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("Invalid configuration in '{path}': {message}")]
    Config { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;

impl From<duckdb::Error> for SessionError {
    fn from(err: duckdb::Error) -> Self {
        SessionError::EngineExecution {
            message: err.to_string(),
            statement: None,
        }
    }
}

impl From<duckdb::arrow::error::ArrowError> for SessionError {
    fn from(err: duckdb::arrow::error::ArrowError) -> Self {
        SessionError::Arrow(err.to_string())
    }
}

impl SessionError {
    /// Records the statement an engine failure came from. Other errors are
    /// returned unchanged.
    pub fn with_statement(self, sql: impl Into<String>) -> Self {
        match self {
            SessionError::EngineExecution { message, .. } => SessionError::EngineExecution {
                message,
                statement: Some(sql.into()),
            },
            other => other,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::SqlGen(e) => e.code(),
            SessionError::EngineExecution { .. } => ErrorCode::EngineExecution,
            SessionError::ConnectionClosed => ErrorCode::ConnectionClosed,
            SessionError::UnsupportedType { .. } => ErrorCode::UnsupportedColumnType,
            SessionError::Arrow(_) => ErrorCode::ArrowConversion,
            SessionError::Config { .. } => ErrorCode::InvalidConfig,
        }
    }

    pub fn to_duckquery_error(&self) -> DuckQueryError {
        match self {
            SessionError::SqlGen(e) => e.to_duckquery_error(),
            SessionError::EngineExecution { message, statement } => {
                DuckQueryError::new(self.code(), message.clone()).with_context(
                    ErrorContext::Engine {
                        statement: statement.clone(),
                    },
                )
            }
            SessionError::ConnectionClosed => DuckQueryError::new(self.code(), self.to_string())
                .with_hint("Create a new session; closed sessions cannot be reopened"),
            SessionError::UnsupportedType { .. } => {
                DuckQueryError::new(self.code(), self.to_string())
                    .with_hint("Cast the column to a numeric, boolean, string, date or timestamp type")
            }
            SessionError::Arrow(_) => DuckQueryError::new(self.code(), self.to_string()),
            SessionError::Config { path, .. } => DuckQueryError::new(self.code(), self.to_string())
                .with_context(ErrorContext::Config {
                    file_path: Some(path.clone()),
                    field: None,
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_message_unchanged() {
        let err = SessionError::EngineExecution {
            message: "Catalog Error: Table with name nope does not exist!".to_string(),
            statement: None,
        };
        assert_eq!(
            err.to_string(),
            "Catalog Error: Table with name nope does not exist!"
        );
        assert_eq!(err.to_duckquery_error().code, ErrorCode::EngineExecution);
    }

    #[test]
    fn test_sql_gen_passthrough() {
        let err: SessionError = SqlGenError::MissingValues.into();
        assert_eq!(err.code(), ErrorCode::MissingValues);
        assert_eq!(err.to_string(), SqlGenError::MissingValues.to_string());
    }

    #[test]
    fn test_closed_hint() {
        let dq = SessionError::ConnectionClosed.to_duckquery_error();
        assert_eq!(dq.code, ErrorCode::ConnectionClosed);
        assert!(dq.hint.is_some());
    }

    #[test]
    fn test_statement_attached_to_engine_context() {
        let err = SessionError::EngineExecution {
            message: "Parser Error".to_string(),
            statement: None,
        }
        .with_statement("SELECT * FROM \"current_df\" WHERE name = '?'");

        let dq = err.to_duckquery_error();
        match dq.context {
            Some(ErrorContext::Engine { statement }) => assert_eq!(
                statement.as_deref(),
                Some("SELECT * FROM \"current_df\" WHERE name = '?'")
            ),
            other => panic!("expected engine context, got {:?}", other),
        }

        let untouched = SessionError::ConnectionClosed.with_statement("SELECT 1");
        assert!(matches!(untouched, SessionError::ConnectionClosed));
    }

    #[test]
    fn test_config_error_code() {
        let err = SessionError::Config {
            path: "duckquery.yaml".to_string(),
            message: "threads out of range".to_string(),
        };
        let dq = err.to_duckquery_error();
        assert_eq!(dq.code, ErrorCode::InvalidConfig);
        assert!(matches!(
            dq.context,
            Some(ErrorContext::Config { file_path: Some(ref p), .. }) if p == "duckquery.yaml"
        ));
    }
}
