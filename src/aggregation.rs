//! Top salaries across every employee file in object storage.
//!
//! One fetch task is spawned per discovered file. A semaphore caps how many
//! of them read from storage at once; the rest wait for a permit. All tasks
//! are joined before ranking. A task that fails contributes nothing.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::core::models::Employee;
use crate::files::{EmployeeFiles, JSON_SUFFIX};

/// Concurrent storage reads per aggregation.
pub const FETCH_WORKERS: usize = 3;

/// Size of the report.
pub const TOP_SALARIES_LIMIT: usize = 10;

#[derive(Clone)]
pub struct TopSalaries {
    files: Arc<dyn EmployeeFiles>,
    workers: usize,
    limit: usize,
}

impl TopSalaries {
    pub fn new(files: Arc<dyn EmployeeFiles>) -> Self {
        Self {
            files,
            workers: FETCH_WORKERS,
            limit: TOP_SALARIES_LIMIT,
        }
    }

    /// Overrides the worker count. Zero is treated as one.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Lists the JSON files, reads them concurrently and returns the
    /// highest-paid employees, best first. Never fails; unreadable files
    /// are skipped.
    pub async fn compute(&self) -> Vec<Employee> {
        let keys = self.files.list_keys(JSON_SUFFIX).await;
        info!(files = keys.len(), workers = self.workers, "Aggregating employee files");

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        for key in keys {
            let files = Arc::clone(&self.files);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return Vec::new();
                };
                files.fetch_and_parse(&key).await
            });
        }

        let mut all = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(part) => all.extend(part),
                Err(e) => warn!("File fetch task failed: {}", e),
            }
        }

        rank_by_salary(all, self.limit)
    }
}

/// Sorts by salary, highest first, and keeps at most `limit` entries.
/// Equal salaries keep their input order.
pub fn rank_by_salary(mut employees: Vec<Employee>, limit: usize) -> Vec<Employee> {
    employees.sort_by(|a, b| b.salary.total_cmp(&a.salary));
    employees.truncate(limit);
    employees
}
