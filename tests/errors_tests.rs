use std::error::Error;

use employee_api::errors::{EmployeeError, RouteError, StoreError};

#[test]
fn test_errors_implement_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    assert_error(&EmployeeError::Validation("test error".to_string()));
    assert_error(&StoreError::msg("Database error", "boom"));
    assert_error(&RouteError::NotFound);
}

#[test]
fn test_error_display() {
    let error = EmployeeError::Validation("salary must be greater than 0".to_string());
    assert_eq!(
        format!("{error}"),
        "Invalid employee: salary must be greater than 0"
    );

    let error = EmployeeError::NotFound(12);
    assert_eq!(format!("{error}"), "No employee found with id: 12");

    let error: EmployeeError = RouteError::MalformedId.into();
    assert_eq!(format!("{error}"), "Malformed URL or missing employee id.");
}

#[test]
fn test_store_error_keeps_cause() {
    let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
    let error = StoreError::new("Error deleting employee", cause);

    assert_eq!(error.context(), "Error deleting employee");
    assert_eq!(format!("{error}"), "Error deleting employee: reset by peer");
    assert_eq!(error.source().unwrap().to_string(), "reset by peer");

    let wrapped: EmployeeError = error.into();
    match wrapped {
        EmployeeError::Store(inner) => assert!(inner.to_string().contains("reset by peer")),
        _ => panic!("Unexpected error type"),
    }
}
