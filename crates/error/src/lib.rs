//! Machine-readable errors for duckquery.
//!
//! The `thiserror` enums of the other crates (`SqlGenError`, `SessionError`)
//! convert into [`DuckQueryError`]: a stable `DQ-XXXX` code, the message, an
//! optional tagged [`ErrorContext`] and an optional hint.

mod code;
mod context;
mod suggest;

pub use code::{ErrorCategory, ErrorCode};
pub use context::ErrorContext;
pub use suggest::closest_match;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuckQueryError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// How to fix the offending call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl DuckQueryError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Compact JSON form. Falls back to code and message only if the context
    /// cannot be serialized.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(code = %self.code, error = %e, "Error context did not serialize");
                serde_json::json!({ "code": self.code.as_str(), "message": self.message })
                    .to_string()
            }
        }
    }
}

impl fmt::Display for DuckQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        match &self.hint {
            Some(hint) => write!(f, ". Hint: {}", hint),
            None => Ok(()),
        }
    }
}

impl std::error::Error for DuckQueryError {}

pub type Result<T> = std::result::Result<T, DuckQueryError>;
