//! Opens the database connection the API would use and reports whether it works.

use anyhow::{Context, Result};
use employee_api::core::config::AppConfig;
use employee_api::core::secrets;
use employee_api::store::{PgConnector, PgEmployeeStore};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    employee_api::setup_logging();

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    let pg_config = secrets::resolve_pg_config(&config)
        .await
        .context("resolving database credentials")?;

    info!("Testing database connection...");
    let store = PgEmployeeStore::new(PgConnector::new(pg_config));
    let result = store.check_connection().await;
    store.shutdown().await;

    match result {
        Ok(()) => {
            info!("Database connection succeeded");
            Ok(())
        }
        Err(e) => {
            error!("Database connection failed: {}", e);
            Err(e.into())
        }
    }
}
