//! Employee API - a serverless CRUD API for employee records.
//!
//! A single Lambda behind an API Gateway proxy integration serves:
//! - `GET|POST /employees`
//! - `GET|PUT|DELETE /employees/{id}`
//! - `GET /employees/salary/top`, the ten highest salaries found in the
//!   JSON files of an S3 bucket
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - Postgres stored routines for persistence, through one shared connection
//! - S3 for the salary report inputs, read concurrently by a bounded pool
//! - SSM Parameter Store / Secrets Manager for database credentials
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use employee_api::core::config::AppConfig;
//! use employee_api::service::EmployeeService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     employee_api::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let service = Arc::new(EmployeeService::from_config(&config).await?);
//!
//!     for employee in service.top_salaries().await {
//!         println!("{} earns {}", employee.name, employee.salary);
//!     }
//!     Ok(())
//! }
//! ```
pub mod aggregation;
pub mod api;
pub mod core;
pub mod errors;
pub mod files;
pub mod service;
pub mod store;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Call it once at
/// the start of each binary.
///
/// # Example
///
/// ```
/// employee_api::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
