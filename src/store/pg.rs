// ============================================================================
// Postgres-backed employee store.
//
// Every operation calls one stored routine:
//   sp_get_all_employees()                          -> SETOF employees
//   sp_get_employee_by_id(id)                       -> SETOF employees
//   sp_create_employee(name, position, salary, hire_date, department) -> INTEGER
//   PROCEDURE sp_update_employee(id, name, position, salary, hire_date, department)
//   PROCEDURE sp_delete_employee(id)
// ============================================================================

use std::sync::{Arc, Mutex, TryLockError};

use async_trait::async_trait;
use postgres::{Client, NoTls, Row};
use tracing::{debug, error, info};

use super::EmployeeStore;
use super::connection::{ConnectionHandle, Connector};
use crate::core::models::Employee;
use crate::errors::StoreError;

const EMPLOYEE_COLUMNS: &str = "id, name, position, salary, hire_date, department";

/// Opens Postgres connections from a resolved config.
pub struct PgConnector {
    config: postgres::Config,
}

impl PgConnector {
    #[must_use]
    pub fn new(config: postgres::Config) -> Self {
        Self { config }
    }
}

/// A single client shared behind a mutex; statements on it are serialized.
pub struct PgConnection {
    client: Option<Mutex<Client>>,
}

impl Drop for PgConnection {
    fn drop(&mut self) {
        // The sync client owns a runtime that must not be dropped on an async worker.
        if let Some(client) = self.client.take() {
            let _ = std::thread::spawn(move || drop(client));
        }
    }
}

impl PgConnection {
    fn with_client<T>(
        &self,
        context: &str,
        f: impl FnOnce(&mut Client) -> Result<T, postgres::Error>,
    ) -> Result<T, StoreError> {
        let mutex = self
            .client
            .as_ref()
            .ok_or_else(|| StoreError::msg(context, "connection closed"))?;
        let mut client = mutex
            .lock()
            .map_err(|_| StoreError::msg(context, "connection lock poisoned"))?;
        f(&mut *client).map_err(|e| StoreError::new(context, e))
    }
}

impl Connector for PgConnector {
    type Connection = PgConnection;

    fn connect(&self) -> Result<PgConnection, StoreError> {
        let client = self
            .config
            .connect(NoTls)
            .map_err(|e| StoreError::new("Failed to connect to database", e))?;
        Ok(PgConnection {
            client: Some(Mutex::new(client)),
        })
    }

    fn is_closed(&self, connection: &PgConnection) -> bool {
        match &connection.client {
            Some(mutex) => reports_closed(mutex, Client::is_closed),
            None => true,
        }
    }
}

/// Inspects the value behind `mutex` only if it is free. A holder is running
/// a statement, so the connection is alive; a poisoned lock is unusable.
fn reports_closed<T>(mutex: &Mutex<T>, closed: impl FnOnce(&T) -> bool) -> bool {
    match mutex.try_lock() {
        Ok(guard) => closed(&*guard),
        Err(TryLockError::WouldBlock) => false,
        Err(TryLockError::Poisoned(_)) => true,
    }
}

fn employee_from_row(row: &Row) -> Result<Employee, postgres::Error> {
    Ok(Employee {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        salary: row.try_get("salary")?,
        hire_date: row.try_get("hire_date")?,
        department: row.try_get("department")?,
    })
}

pub struct PgEmployeeStore {
    handle: Arc<ConnectionHandle<PgConnector>>,
}

impl PgEmployeeStore {
    #[must_use]
    pub fn new(connector: PgConnector) -> Self {
        Self {
            handle: Arc::new(ConnectionHandle::new(connector)),
        }
    }

    /// Runs one statement on the shared connection from a blocking thread.
    async fn run<T, F>(&self, context: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Client) -> Result<T, postgres::Error> + Send + 'static,
    {
        let handle = Arc::clone(&self.handle);
        let result = tokio::task::spawn_blocking(move || {
            let conn = handle.acquire()?;
            let result = conn.with_client(context, f);
            handle.release(conn);
            result
        })
        .await
        .map_err(|e| StoreError::new(context, e))?;

        if let Err(e) = &result {
            error!("[DB] {}", e);
        }
        result
    }

    /// Opens (or reuses) the connection and runs a trivial query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn check_connection(&self) -> Result<(), StoreError> {
        self.run("Connection check failed", |client| {
            client.simple_query("SELECT 1").map(|_| ())
        })
        .await
    }

    /// Closes the shared connection; later operations fail.
    pub async fn shutdown(&self) {
        let handle = Arc::clone(&self.handle);
        if let Err(e) = tokio::task::spawn_blocking(move || handle.shutdown()).await {
            error!("Failed to shut down database connection: {}", e);
        }
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn list_all(&self) -> Result<Vec<Employee>, StoreError> {
        debug!("[DB] Fetching all employees");
        self.run("Error fetching employees", |client| {
            let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM sp_get_all_employees()");
            client
                .query(sql.as_str(), &[])?
                .iter()
                .map(employee_from_row)
                .collect()
        })
        .await
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Employee>, StoreError> {
        info!("[DB] Fetching employee with id: {}", id);
        self.run("Error fetching employee", move |client| {
            let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM sp_get_employee_by_id($1)");
            client
                .query_opt(sql.as_str(), &[&id])?
                .as_ref()
                .map(employee_from_row)
                .transpose()
        })
        .await
    }

    async fn create(&self, employee: &Employee) -> Result<i32, StoreError> {
        info!("[DB] Inserting employee: {}", employee.name);
        let e = employee.clone();
        let id = self
            .run("Error inserting employee", move |client| {
                let row = client.query_one(
                    "SELECT sp_create_employee($1, $2, $3, $4, $5)",
                    &[&e.name, &e.position, &e.salary, &e.hire_date, &e.department],
                )?;
                row.try_get::<_, i32>(0)
            })
            .await?;
        info!("[DB] Employee inserted with id: {}", id);
        Ok(id)
    }

    async fn update(&self, employee: &Employee) -> Result<(), StoreError> {
        info!("[DB] Updating employee with id: {}", employee.id);
        let e = employee.clone();
        self.run("Error updating employee", move |client| {
            client
                .execute(
                    "CALL sp_update_employee($1, $2, $3, $4, $5, $6)",
                    &[&e.id, &e.name, &e.position, &e.salary, &e.hire_date, &e.department],
                )
                .map(|_| ())
        })
        .await
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        info!("[DB] Deleting employee with id: {}", id);
        self.run("Error deleting employee", move |client| {
            client.execute("CALL sp_delete_employee($1)", &[&id]).map(|_| ())
        })
        .await
    }
}
