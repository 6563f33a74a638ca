//! # Error Contexts
//!
//! Structured metadata attached to errors for programmatic handling.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Context for DQ-2008 (FieldNotFound)
    FieldNotFound {
        field: String,
        table: Option<String>,
        available_fields: Vec<String>,
    },

    /// Context for DQ-2009 (TableNotFound)
    TableNotFound {
        table: String,
        available_tables: Vec<String>,
    },

    /// Context for DQ-2007 (AmbiguousColumn)
    AmbiguousColumn {
        column: String,
        candidates: Vec<String>,
    },

    /// Context for DQ-1001 (EngineExecution)
    Engine {
        /// The statement that failed, with literals scrubbed
        statement: Option<String>,
    },

    /// Context for DQ-3001 (InvalidConfig)
    Config {
        file_path: Option<String>,
        field: Option<String>,
    },

    /// Generic key-value context for extensibility
    Generic {
        #[serde(flatten)]
        data: std::collections::HashMap<String, serde_json::Value>,
    },
}
