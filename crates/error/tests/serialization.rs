use mylite_error::{ErrorCode, ErrorContext, InstallPhase, MyliteError};
use serde_json::Value;

#[test]
fn test_json_serialization() {
    let error = MyliteError::new(ErrorCode::StatementFailed, "table wp_posts already exists")
        .with_context(ErrorContext::Statement {
            phase: InstallPhase::Tables,
            statement: "CREATE TABLE wp_posts (ID integer)".to_string(),
            diagnostic: "table wp_posts already exists".to_string(),
        })
        .with_hint("Drop the existing database file before reinstalling");

    let json = error.to_json();
    let v: Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(v["code"], "MYLITE-2001");
    assert_eq!(v["message"], "table wp_posts already exists");
    assert_eq!(v["context"]["type"], "statement");
    assert_eq!(v["context"]["phase"], "tables");
    assert_eq!(v["context"]["statement"], "CREATE TABLE wp_posts (ID integer)");
}

#[test]
fn test_error_code_parsing() {
    let code: ErrorCode = "MYLITE-4002".to_string().try_into().unwrap();
    assert_eq!(code, ErrorCode::EngineBusy);
}

#[test]
fn test_error_roundtrips_through_json() {
    let error = MyliteError::unsupported_function("ucasee", ["ucase", "lcase"]);
    let back: MyliteError = serde_json::from_str(&error.to_json()).unwrap();
    assert_eq!(back.code, ErrorCode::UnsupportedFunction);
    assert_eq!(back.hint, error.hint);
}
