//! Error handling tests
//!
//! Tests for CLI error types and user-friendly messages.

use std::path::PathBuf;

use floatchat_cli::error::CliError;
use floatchat_query::QueryError;

#[test]
fn test_invalid_argument_user_message() {
    let error = CliError::InvalidArgument {
        message: "limit must be positive".to_string(),
    };
    let msg = error.user_message();
    assert!(msg.contains("Invalid argument"));
    assert!(msg.contains("limit must be positive"));
    assert!(msg.contains("floatchat --help"));
}

#[test]
fn test_dataset_unavailable_suggests_flag() {
    let error = CliError::DatasetUnavailable {
        path: PathBuf::from("processed_data/master_dataset.csv"),
    };
    let msg = error.user_message();
    assert!(msg.contains("processed_data/master_dataset.csv"));
    assert!(msg.contains("--data"));
}

#[test]
fn test_config_error_from_query_error() {
    let error: CliError = QueryError::ConfigError("Result cap must be greater than 0".into()).into();
    assert!(matches!(error, CliError::Config(_)));
    assert!(error.user_message().contains("floatchat config"));
}

#[test]
fn test_other_query_errors_keep_their_message() {
    let error: CliError = QueryError::DatasetError("no recognised columns".into()).into();
    match &error {
        CliError::Query(msg) => assert!(msg.contains("no recognised columns")),
        other => panic!("Expected Query error, got {:?}", other),
    }
    assert!(error.technical_details().contains("Query"));
}
