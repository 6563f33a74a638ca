use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following DQ-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Execution engine errors
/// - **2000-2999**: Query construction errors
/// - **3000-3999**: Configuration errors
/// - **5000-5999**: Internal errors
///
/// Codes are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Engine Errors (1000-1999) ===
    /// DQ-1001: The engine rejected or failed to run a statement
    EngineExecution = 1001,
    /// DQ-1002: The engine connection was already released
    ConnectionClosed = 1002,
    /// DQ-1003: A column type cannot be registered with the engine
    UnsupportedColumnType = 1003,

    // === Query Construction Errors (2000-2999) ===
    /// DQ-2001: Empty or malformed identifier
    InvalidIdentifier = 2001,
    /// DQ-2002: Empty or out-of-range argument
    InvalidArgument = 2002,
    /// DQ-2003: Aggregate function outside the supported set
    UnsupportedAggregate = 2003,
    /// DQ-2004: Ordering token other than ASC/DESC
    InvalidDirection = 2004,
    /// DQ-2005: Pivot called without an explicit value list
    MissingValues = 2005,
    /// DQ-2006: Unpivot called without source columns
    MissingColumns = 2006,
    /// DQ-2007: Bare column name supplied by several tables
    AmbiguousColumn = 2007,
    /// DQ-2008: Column not present in the source relation
    FieldNotFound = 2008,
    /// DQ-2009: Table is not registered
    TableNotFound = 2009,
    /// DQ-2010: Transform step id does not belong to the arena
    UnknownStep = 2010,
    /// DQ-2011: Buffer step referenced before materialization
    Unmaterialized = 2011,

    // === Configuration Errors (3000-3999) ===
    /// DQ-3001: Configuration could not be loaded or failed validation
    InvalidConfig = 3001,

    // === Internal Errors (5000-5999) ===
    /// DQ-5001: Arrow batch construction failed
    ArrowConversion = 5001,

    /// DQ-9999: Unknown/unclassified error
    Unknown = 9999,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "DQ-2001")
    pub fn as_str(&self) -> String {
        format!("DQ-{:04}", self.as_u16())
    }

    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Engine,
            2000..=2999 => ErrorCategory::Query,
            3000..=3999 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("DQ-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::EngineExecution),
            1002 => Ok(Self::ConnectionClosed),
            1003 => Ok(Self::UnsupportedColumnType),
            2001 => Ok(Self::InvalidIdentifier),
            2002 => Ok(Self::InvalidArgument),
            2003 => Ok(Self::UnsupportedAggregate),
            2004 => Ok(Self::InvalidDirection),
            2005 => Ok(Self::MissingValues),
            2006 => Ok(Self::MissingColumns),
            2007 => Ok(Self::AmbiguousColumn),
            2008 => Ok(Self::FieldNotFound),
            2009 => Ok(Self::TableNotFound),
            2010 => Ok(Self::UnknownStep),
            2011 => Ok(Self::Unmaterialized),
            3001 => Ok(Self::InvalidConfig),
            5001 => Ok(Self::ArrowConversion),
            9999 => Ok(Self::Unknown),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Engine,
    Query,
    Config,
    Internal,
}
