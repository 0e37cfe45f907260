//! Employee JSON files kept in object storage.
//!
//! Both operations are best effort: a listing or read failure is logged and
//! reported as "no files" / "no records" instead of failing the caller.

pub mod s3;

use async_trait::async_trait;

use crate::core::models::Employee;

pub use self::s3::S3EmployeeFiles;

pub const JSON_SUFFIX: &str = ".json";

#[async_trait]
pub trait EmployeeFiles: Send + Sync {
    /// Keys in the container ending with `suffix`. Empty on failure.
    async fn list_keys(&self, suffix: &str) -> Vec<String>;

    /// Records held in the object at `key`. Empty on failure.
    async fn fetch_and_parse(&self, key: &str) -> Vec<Employee>;
}

/// Keeps only the keys ending with `suffix`.
pub fn retain_suffix<I>(keys: I, suffix: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter().filter(|k| k.ends_with(suffix)).collect()
}

/// Parses a file body as a JSON array of employees.
///
/// # Errors
///
/// Returns the deserializer error for anything that is not such an array.
pub fn parse_employee_file(bytes: &[u8]) -> Result<Vec<Employee>, serde_json::Error> {
    serde_json::from_slice(bytes)
}
