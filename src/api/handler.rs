//! API Lambda handler - thin wrapper around the router.
//!
//! Parses the proxy event, dispatches it, and guarantees a JSON envelope
//! even when a handler panics.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use super::{helpers, parsing, router};
use crate::service::EmployeeService;

pub use self::function_handler as handler;

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never returns `Err`; every failure is reported as a status code in the
/// returned envelope.
#[tracing::instrument(level = "info", skip(service, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    service: &EmployeeService,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(handle_payload(service, &event.payload).await)
}

/// Processes one proxy event payload into a response envelope.
pub async fn handle_payload(service: &EmployeeService, payload: &Value) -> Value {
    let request = match parsing::parse_proxy_request(payload) {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to parse request: {}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };
    info!(path = ?request.path, method = %request.method, "Request received");

    let response = match AssertUnwindSafe(router::dispatch(service, &request))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown failure".to_string());
            error!("Handler panicked: {}", reason);
            helpers::err_response(500, &format!("Internal error: {reason}"))
        }
    };

    info!(status = %response["statusCode"], "Request finished");
    response
}
