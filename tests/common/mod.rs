#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use employee_api::core::models::Employee;
use employee_api::errors::StoreError;
use employee_api::files::EmployeeFiles;
use employee_api::store::EmployeeStore;

pub fn employee(name: &str, salary: f64) -> Employee {
    Employee {
        id: 0,
        name: name.to_string(),
        position: "Engineer".to_string(),
        salary,
        hire_date: "2020-01-15".to_string(),
        department: "Platform".to_string(),
    }
}

/// Store fake that records every call it receives.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<BTreeMap<i32, Employee>>,
    next_id: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
    pub panics: bool,
}

impl InMemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        if self.panics {
            panic!("row decoder exploded");
        }
        if self.fail {
            return Err(StoreError::msg("Database error", "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Employee>, StoreError> {
        self.record("list_all".to_string())?;
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Employee>, StoreError> {
        self.record(format!("get_by_id({id})"))?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, employee: &Employee) -> Result<i32, StoreError> {
        self.record("create".to_string())?;
        let id = i32::try_from(self.next_id.fetch_add(1, Ordering::SeqCst) + 1).unwrap();
        self.rows
            .lock()
            .unwrap()
            .insert(id, employee.clone().with_id(id));
        Ok(id)
    }

    async fn update(&self, employee: &Employee) -> Result<(), StoreError> {
        self.record(format!("update({})", employee.id))?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.get_mut(&employee.id) {
            *row = employee.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.record(format!("delete({id})"))?;
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Files fake. Keys listed in `broken` yield nothing, keys in `panicking`
/// panic inside the fetch task.
#[derive(Default)]
pub struct FakeFiles {
    pub files: Vec<(String, Vec<Employee>)>,
    pub broken: Vec<String>,
    pub panicking: Vec<String>,
    pub delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub fetches: AtomicUsize,
    pub listings: AtomicUsize,
}

impl FakeFiles {
    pub fn new(files: Vec<(&str, Vec<Employee>)>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl EmployeeFiles for FakeFiles {
    async fn list_keys(&self, suffix: &str) -> Vec<String> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.files
            .iter()
            .map(|(k, _)| k.clone())
            .filter(|k| k.ends_with(suffix))
            .collect()
    }

    async fn fetch_and_parse(&self, key: &str) -> Vec<Employee> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.iter().any(|k| k == key) {
            panic!("corrupt object {key}");
        }
        if self.broken.iter().any(|k| k == key) {
            return Vec::new();
        }
        self.files
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }
}
