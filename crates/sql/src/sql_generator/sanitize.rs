//! Identifier and literal quoting.
//!
//! Every user-supplied name that ends up in generated SQL goes through
//! [`quote`]; this is the injection boundary for identifiers.

use super::error::SqlGenError;

/// Wraps `name` in double quotes, doubling any embedded double quote.
pub fn quote(name: &str) -> Result<String, SqlGenError> {
    if name.is_empty() {
        return Err(SqlGenError::InvalidIdentifier(
            "identifier name cannot be empty".to_string(),
        ));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Wraps `value` in single quotes, doubling any embedded single quote.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub use duckquery_common::ident::is_plain_identifier;

/// Renders `relation."column"`. Plain relation names stay bare, anything else
/// is quoted.
pub fn quote_qualified(relation: &str, column: &str) -> Result<String, SqlGenError> {
    let relation = if is_plain_identifier(relation) {
        relation.to_string()
    } else {
        quote(relation)?
    };
    Ok(format!("{}.{}", relation, quote(column)?))
}

/// Quotes a relation name for use in FROM/JOIN position.
pub fn quote_relation(name: &str) -> Result<String, SqlGenError> {
    if name.is_empty() {
        return Err(SqlGenError::InvalidArgument(
            "table name cannot be empty".to_string(),
        ));
    }
    quote(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("column").unwrap(), "\"column\"");
        assert_eq!(quote("my\"column").unwrap(), "\"my\"\"column\"");
        assert_eq!(quote("a b").unwrap(), "\"a b\"");
        assert!(matches!(
            quote(""),
            Err(SqlGenError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_quote_injection_attempt() {
        let quoted = quote("x\"; DROP TABLE users; --").unwrap();
        assert_eq!(quoted, "\"x\"\"; DROP TABLE users; --\"");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("East"), "'East'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(quote_qualified("current_df", "id").unwrap(), "current_df.\"id\"");
        assert_eq!(
            quote_qualified("my table", "id").unwrap(),
            "\"my table\".\"id\""
        );
    }

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("dept"));
        assert!(is_plain_identifier("_t1"));
        assert!(!is_plain_identifier("1t"));
        assert!(!is_plain_identifier("a-b"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn test_quote_relation_empty() {
        assert!(matches!(
            quote_relation(""),
            Err(SqlGenError::InvalidArgument(_))
        ));
    }
}
