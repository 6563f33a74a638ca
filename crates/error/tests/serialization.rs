use duckquery_error::{DuckQueryError, ErrorCode, ErrorContext};
use serde_json::Value;

#[test]
fn test_json_serialization() {
    let error = DuckQueryError::new(ErrorCode::FieldNotFound, "Column 'nmae' not found")
        .with_context(ErrorContext::FieldNotFound {
            field: "nmae".to_string(),
            table: Some("current_df".to_string()),
            available_fields: vec!["name".to_string(), "age".to_string()],
        })
        .with_hint("Did you mean 'name'?");

    let json = error.to_json();
    let v: Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(v["code"], "DQ-2008");
    assert_eq!(v["message"], "Column 'nmae' not found");
    assert_eq!(v["hint"], "Did you mean 'name'?");
    assert_eq!(v["context"]["type"], "field_not_found");
    assert_eq!(v["context"]["field"], "nmae");
}

#[test]
fn test_error_code_parsing() {
    let code: ErrorCode = "DQ-2003".to_string().try_into().unwrap();
    assert_eq!(code, ErrorCode::UnsupportedAggregate);
}

#[test]
fn test_roundtrip_through_json() {
    let error = DuckQueryError::new(ErrorCode::TableNotFound, "Table 'dept' is not registered")
        .with_context(ErrorContext::TableNotFound {
            table: "dept".to_string(),
            available_tables: vec!["current_df".to_string(), "depts".to_string()],
        });

    let back: DuckQueryError = serde_json::from_str(&error.to_json()).unwrap();
    assert_eq!(back.code, ErrorCode::TableNotFound);
    assert!(back.hint.is_none());
}
