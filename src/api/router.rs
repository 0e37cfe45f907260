//! Route matching and dispatch.
//!
//! Shapes are tried in a fixed order: `employees/<id>`, `employees`,
//! `employees/salary/top`. Anything else under `employees/` is a malformed
//! id (400); anything outside it is not found (404). A matched shape with a
//! method it does not support is also 404.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};
use tracing::{error, warn};

use super::helpers;
use super::parsing::ProxyRequest;
use crate::core::models::Employee;
use crate::errors::{EmployeeError, RouteError};
use crate::service::EmployeeService;

static EMPLOYEE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^employees/(\d+)$").expect("static regex compile"));

const EMPLOYEES: &str = "employees";
const EMPLOYEES_PREFIX: &str = "employees/";
const TOP_SALARIES: &str = "employees/salary/top";

/// A recognized path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    EmployeeById(i32),
    Employees,
    TopSalaries,
}

impl Route {
    /// Parses a proxy path such as `employees/42`.
    ///
    /// # Errors
    ///
    /// [`RouteError::MalformedId`] for any other suffix under `employees/`
    /// (including ids that are zero or do not fit), [`RouteError::NotFound`]
    /// for everything else.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        if let Some(caps) = EMPLOYEE_ID_RE.captures(path) {
            return match caps[1].parse::<i32>() {
                Ok(id) if id > 0 => Ok(Route::EmployeeById(id)),
                _ => Err(RouteError::MalformedId),
            };
        }
        if path == EMPLOYEES {
            return Ok(Route::Employees);
        }
        if path == TOP_SALARIES {
            return Ok(Route::TopSalaries);
        }
        if path.starts_with(EMPLOYEES_PREFIX) {
            return Err(RouteError::MalformedId);
        }
        Err(RouteError::NotFound)
    }
}

/// The operation a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListAll,
    Create,
    GetById(i32),
    Update(i32),
    Delete(i32),
    TopSalaries,
}

impl Action {
    /// Resolves a path and method to an action.
    ///
    /// # Errors
    ///
    /// Returns the route error for unknown or malformed paths, and
    /// [`RouteError::NotFound`] for a method the matched shape does not serve.
    pub fn resolve(path: Option<&str>, method: &str) -> Result<Self, RouteError> {
        let route = Route::parse(path.ok_or(RouteError::NotFound)?)?;
        match (route, method) {
            (Route::EmployeeById(id), "GET") => Ok(Action::GetById(id)),
            (Route::EmployeeById(id), "PUT") => Ok(Action::Update(id)),
            (Route::EmployeeById(id), "DELETE") => Ok(Action::Delete(id)),
            (Route::Employees, "GET") => Ok(Action::ListAll),
            (Route::Employees, "POST") => Ok(Action::Create),
            (Route::TopSalaries, "GET") => Ok(Action::TopSalaries),
            _ => Err(RouteError::NotFound),
        }
    }

    fn failure_label(self) -> &'static str {
        match self {
            Action::ListAll => "Error fetching employees",
            Action::Create => "Error creating employee",
            Action::GetById(_) => "Error fetching employee by id",
            Action::Update(_) => "Error updating employee",
            Action::Delete(_) => "Error deleting employee",
            Action::TopSalaries => "Error fetching top salaries",
        }
    }
}

/// Routes a request to the service and builds the response envelope.
pub async fn dispatch(service: &EmployeeService, request: &ProxyRequest) -> Value {
    let action = match Action::resolve(request.path.as_deref(), &request.method) {
        Ok(action) => action,
        Err(e) => {
            warn!(path = ?request.path, method = %request.method, "{}", e);
            return route_error_response(e);
        }
    };

    match run(service, action, request.body.as_deref()).await {
        Ok(response) => response,
        Err(e) => failure_response(action, &e),
    }
}

async fn run(
    service: &EmployeeService,
    action: Action,
    body: Option<&str>,
) -> Result<Value, EmployeeError> {
    match action {
        Action::ListAll => Ok(helpers::ok_json(200, &service.list_all().await?)),
        Action::Create => {
            let id = service.create(parse_employee(body)?).await?;
            Ok(helpers::json_response(
                201,
                json!({ "message": "Employee created.", "id": id }).to_string(),
            ))
        }
        Action::GetById(id) => match service.get_by_id(id).await {
            Ok(employee) => Ok(helpers::ok_json(200, &employee)),
            // Absence is reported in the body, not the status.
            Err(EmployeeError::NotFound(id)) => Ok(helpers::err_response(
                200,
                &EmployeeError::NotFound(id).to_string(),
            )),
            Err(e) => Err(e),
        },
        Action::Update(id) => {
            service.update(id, parse_employee(body)?).await?;
            Ok(helpers::message_response(200, "Employee updated."))
        }
        Action::Delete(id) => {
            service.delete(id).await?;
            Ok(helpers::message_response(200, "Employee deleted."))
        }
        Action::TopSalaries => Ok(helpers::ok_json(200, &service.top_salaries().await)),
    }
}

fn parse_employee(body: Option<&str>) -> Result<Employee, EmployeeError> {
    let body = body
        .filter(|b| !b.trim().is_empty())
        .ok_or_else(|| EmployeeError::Validation("request body is required".to_string()))?;
    serde_json::from_str(body)
        .map_err(|e| EmployeeError::Validation(format!("invalid employee JSON: {e}")))
}

/// Maps a route error to its status code.
#[must_use]
pub fn route_error_response(error: RouteError) -> Value {
    match error {
        RouteError::MalformedId => helpers::err_response(400, &error.to_string()),
        RouteError::NotFound => helpers::err_response(404, &error.to_string()),
    }
}

fn failure_response(action: Action, error: &EmployeeError) -> Value {
    let message = format!("{}: {}", action.failure_label(), error);
    match error {
        EmployeeError::Validation(_) => helpers::err_response(400, &message),
        EmployeeError::Route(route) => route_error_response(*route),
        EmployeeError::NotFound(_) => helpers::err_response(404, &message),
        EmployeeError::Store(_) => {
            error!("{}", message);
            helpers::err_response(500, &message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_precedence() {
        assert_eq!(Route::parse("employees/42"), Ok(Route::EmployeeById(42)));
        assert_eq!(Route::parse("employees"), Ok(Route::Employees));
        assert_eq!(Route::parse("employees/salary/top"), Ok(Route::TopSalaries));
    }

    #[test]
    fn test_malformed_ids() {
        for path in [
            "employees/abc",
            "employees/",
            "employees/12a",
            "employees/-3",
            "employees/0",
            "employees/99999999999",
            "employees/1/extra",
            "employees/salary",
            "employees/salary/top/",
        ] {
            assert_eq!(Route::parse(path), Err(RouteError::MalformedId), "{path}");
        }
    }

    #[test]
    fn test_unknown_paths() {
        for path in ["", "departments", "employeesx", "api/employees/1"] {
            assert_eq!(Route::parse(path), Err(RouteError::NotFound), "{path}");
        }
    }

    #[test]
    fn test_action_resolution() {
        assert_eq!(Action::resolve(Some("employees/42"), "GET"), Ok(Action::GetById(42)));
        assert_eq!(Action::resolve(Some("employees/42"), "PUT"), Ok(Action::Update(42)));
        assert_eq!(Action::resolve(Some("employees/42"), "DELETE"), Ok(Action::Delete(42)));
        assert_eq!(Action::resolve(Some("employees"), "GET"), Ok(Action::ListAll));
        assert_eq!(Action::resolve(Some("employees"), "POST"), Ok(Action::Create));
        assert_eq!(
            Action::resolve(Some("employees/salary/top"), "GET"),
            Ok(Action::TopSalaries)
        );
    }

    #[test]
    fn test_unsupported_method_is_not_found() {
        assert_eq!(Action::resolve(Some("employees/42"), "POST"), Err(RouteError::NotFound));
        assert_eq!(Action::resolve(Some("employees"), "DELETE"), Err(RouteError::NotFound));
        assert_eq!(
            Action::resolve(Some("employees/salary/top"), "PUT"),
            Err(RouteError::NotFound)
        );
        assert_eq!(Action::resolve(None, "GET"), Err(RouteError::NotFound));
        assert_eq!(Action::resolve(Some("employees/abc"), "PATCH"), Err(RouteError::MalformedId));
    }
}
