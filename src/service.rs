//! Employee operations: validation in front of the store, and the
//! top-salaries report.

use std::sync::Arc;

use tracing::info;

use crate::aggregation::TopSalaries;
use crate::core::config::AppConfig;
use crate::core::models::Employee;
use crate::core::secrets;
use crate::core::validation::validate;
use crate::errors::{EmployeeError, StoreError};
use crate::files::{EmployeeFiles, S3EmployeeFiles};
use crate::store::{EmployeeStore, PgConnector, PgEmployeeStore};

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    top_salaries: TopSalaries,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, files: Arc<dyn EmployeeFiles>) -> Self {
        Self {
            store,
            top_salaries: TopSalaries::new(files),
        }
    }

    /// Replaces the aggregation engine, e.g. to tune its worker count.
    #[must_use]
    pub fn with_top_salaries(mut self, top_salaries: TopSalaries) -> Self {
        self.top_salaries = top_salaries;
        self
    }

    /// Wires the Postgres store and S3 files for a deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if database credentials cannot be resolved.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let pg_config = secrets::resolve_pg_config(config).await?;
        let store = PgEmployeeStore::new(PgConnector::new(pg_config));
        let files = S3EmployeeFiles::from_config(config).await;
        Ok(Self::new(Arc::new(store), Arc::new(files)))
    }

    pub async fn create(&self, employee: Employee) -> Result<i32, EmployeeError> {
        validate(&employee)?;
        info!("Creating employee: {}", employee.name);
        Ok(self.store.create(&employee).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Employee>, EmployeeError> {
        info!("Fetching all employees");
        Ok(self.store.list_all().await?)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Employee, EmployeeError> {
        ensure_positive(id)?;
        info!("Fetching employee with id: {}", id);
        self.store
            .get_by_id(id)
            .await?
            .ok_or(EmployeeError::NotFound(id))
    }

    /// Updates the row `id`; the body's own id is ignored.
    pub async fn update(&self, id: i32, employee: Employee) -> Result<(), EmployeeError> {
        ensure_positive(id)?;
        let employee = employee.with_id(id);
        validate(&employee)?;
        info!("Updating employee with id: {}", id);
        Ok(self.store.update(&employee).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), EmployeeError> {
        ensure_positive(id)?;
        info!("Deleting employee with id: {}", id);
        Ok(self.store.delete(id).await?)
    }

    pub async fn top_salaries(&self) -> Vec<Employee> {
        info!("Fetching top salaries from employee files");
        self.top_salaries.compute().await
    }
}

fn ensure_positive(id: i32) -> Result<(), EmployeeError> {
    if id <= 0 {
        return Err(EmployeeError::Validation(
            "employee id must be a positive number".to_string(),
        ));
    }
    Ok(())
}
