//! Structural checks applied before every create and update.

use super::models::Employee;
use crate::errors::EmployeeError;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Rejects the whole record when any required field is blank or the salary
/// is not strictly positive.
///
/// # Errors
///
/// Returns [`EmployeeError::Validation`] naming the first failing field.
pub fn validate(employee: &Employee) -> Result<(), EmployeeError> {
    if is_blank(&employee.name) {
        return Err(EmployeeError::Validation(
            "employee name must not be empty".to_string(),
        ));
    }
    if is_blank(&employee.position) {
        return Err(EmployeeError::Validation(
            "employee position must not be empty".to_string(),
        ));
    }
    // NaN fails this comparison too.
    if !(employee.salary > 0.0) {
        return Err(EmployeeError::Validation(
            "salary must be greater than 0".to_string(),
        ));
    }
    if is_blank(&employee.hire_date) {
        return Err(EmployeeError::Validation(
            "hire date must not be empty".to_string(),
        ));
    }
    if is_blank(&employee.department) {
        return Err(EmployeeError::Validation(
            "department must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Employee {
        Employee {
            id: 0,
            name: "Ada Lovelace".to_string(),
            position: "Engineer".to_string(),
            salary: 5200.0,
            hire_date: "2021-03-01".to_string(),
            department: "R&D".to_string(),
        }
    }

    #[test]
    fn test_valid_employee_passes() {
        let employee = valid();
        assert!(validate(&employee).is_ok());
        assert_eq!(employee, valid());
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let cases: Vec<fn(&mut Employee)> = vec![
            |e| e.name = "   ".to_string(),
            |e| e.position = String::new(),
            |e| e.hire_date = "\t".to_string(),
            |e| e.department = " \n ".to_string(),
        ];
        for mutate in cases {
            let mut employee = valid();
            mutate(&mut employee);
            assert!(matches!(
                validate(&employee),
                Err(EmployeeError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_non_positive_salary_is_rejected() {
        for salary in [0.0, -0.01, -1000.0, f64::NAN] {
            let mut employee = valid();
            employee.salary = salary;
            let err = validate(&employee).unwrap_err();
            assert_eq!(err.to_string(), "Invalid employee: salary must be greater than 0");
        }
    }

    #[test]
    fn test_default_record_is_rejected() {
        assert!(validate(&Employee::default()).is_err());
    }
}
