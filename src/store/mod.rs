//! Persistence gateway for employee rows.

pub mod connection;
pub mod pg;

use async_trait::async_trait;

use crate::core::models::Employee;
use crate::errors::StoreError;

pub use self::connection::{ConnectionHandle, Connector};
pub use self::pg::{PgConnector, PgEmployeeStore};

/// The five persistence operations. Each is a single round trip; the store
/// alone assigns identifiers.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// All rows, in store-defined order.
    async fn list_all(&self) -> Result<Vec<Employee>, StoreError>;

    /// `Ok(None)` when no row has this id.
    async fn get_by_id(&self, id: i32) -> Result<Option<Employee>, StoreError>;

    /// Inserts the record, ignoring its `id`, and returns the assigned id.
    async fn create(&self, employee: &Employee) -> Result<i32, StoreError>;

    /// Overwrites the row named by `employee.id`.
    async fn update(&self, employee: &Employee) -> Result<(), StoreError>;

    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: i32) -> Result<(), StoreError>;
}
