// Rust guideline compliant 2026-02-06

//! Unit tests for error types and messages.

use tabula_core::Error;

#[test]
fn test_io_error_formatting() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let msg = Error::Io(io_err).to_string();
    assert!(msg.starts_with("IO error"), "got: {msg}");
    assert!(msg.contains("file not found"));
}

#[test]
fn test_json_error_converts() {
    let json_err = serde_json::from_str::<serde_json::Value>("invalid json")
        .expect_err("Should fail to parse invalid JSON");
    let error: Error = json_err.into();
    assert!(matches!(error, Error::Json(_)));
    assert!(error.to_string().starts_with("JSON error"));
}

#[test]
fn test_upstream_error_messages() {
    assert_eq!(
        Error::Catalog("index missing".to_string()).to_string(),
        "Catalog error: index missing"
    );
    assert_eq!(
        Error::Workflow("no chain".to_string()).to_string(),
        "Workflow error: no chain"
    );
    assert_eq!(
        Error::DataManager("read-only".to_string()).to_string(),
        "Data manager error: read-only"
    );
}

#[test]
fn test_definition_error_names_the_problem() {
    let error = Error::InvalidDefinition("Column 'Foo' does not exist".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid listing definition: Column 'Foo' does not exist"
    );
}

#[test]
fn test_deadline_error_reports_elapsed() {
    assert_eq!(
        Error::DeadlineExceeded(1500).to_string(),
        "Deadline exceeded after 1500 ms"
    );
}

#[test]
fn test_error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
