//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::temporal::TemporalError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Ledger not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Ledger not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_temporal_error() {
    let temporal = TemporalError::UnknownTimezone("Nowhere/Land".to_string());
    let core_error: CoreError = temporal.into();

    assert!(matches!(core_error, CoreError::Temporal(_)));
    assert!(core_error.to_string().contains("Nowhere/Land"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing API_DATABASE_URL");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing API_DATABASE_URL"),
        _ => panic!("Expected Configuration error"),
    }
}
