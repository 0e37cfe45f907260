use std::sync::Arc;

use employee_api::api::handler;
use employee_api::core::config::AppConfig;
use employee_api::service::EmployeeService;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    employee_api::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    // Built once per cold start and shared by every invocation.
    let service = Arc::new(EmployeeService::from_config(&config).await.map_err(|e| {
        error!("Failed to initialize service: {}", e);
        Error::from(e.to_string())
    })?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let service = Arc::clone(&service);
        async move { handler(&service, event).await }
    }))
    .await
}
