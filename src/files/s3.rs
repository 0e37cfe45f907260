use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::Client as S3Client;
use tracing::{error, info};

use super::{EmployeeFiles, parse_employee_file, retain_suffix};
use crate::core::config::AppConfig;
use crate::core::models::Employee;
use crate::errors::StoreError;

/// Reads employee files from a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3EmployeeFiles {
    client: S3Client,
    bucket: String,
}

impl S3EmployeeFiles {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client for the configured bucket and region.
    pub async fn from_config(config: &AppConfig) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(region) = &config.s3_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;
        Self::new(S3Client::new(&shared), config.s3_bucket.clone())
    }

    async fn try_list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StoreError::new("s3 list_objects_v2", e))?;
            keys.extend(page.contents().iter().filter_map(|obj| obj.key().map(str::to_string)));
        }
        Ok(keys)
    }

    async fn try_fetch(&self, key: &str) -> Result<Vec<Employee>, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::new("s3 get_object", e))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::new("s3 read body", e))?
            .into_bytes();
        parse_employee_file(&bytes).map_err(|e| StoreError::new("Invalid employee file", e))
    }
}

#[async_trait]
impl EmployeeFiles for S3EmployeeFiles {
    async fn list_keys(&self, suffix: &str) -> Vec<String> {
        match self.try_list_keys().await {
            Ok(all) => {
                let keys = retain_suffix(all, suffix);
                for key in &keys {
                    info!(bucket = %self.bucket, key = %key, "File detected");
                }
                keys
            }
            Err(e) => {
                error!(bucket = %self.bucket, "Failed to list files: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_and_parse(&self, key: &str) -> Vec<Employee> {
        match self.try_fetch(key).await {
            Ok(employees) => {
                info!(key = %key, count = employees.len(), "File read");
                employees
            }
            Err(e) => {
                error!(key = %key, "Failed to read file: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials};

    fn unreachable_bucket() -> S3EmployeeFiles {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url("http://127.0.0.1:1")
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .retry_config(RetryConfig::disabled())
            .force_path_style(true)
            .build();
        S3EmployeeFiles::new(S3Client::from_conf(config), "salaries")
    }

    #[tokio::test]
    async fn test_unreachable_storage_lists_nothing() {
        let files = unreachable_bucket();
        assert!(files.try_list_keys().await.is_err());
        assert!(files.list_keys(".json").await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_storage_reads_nothing() {
        let files = unreachable_bucket();
        let err = files.try_fetch("k.json").await.unwrap_err();
        assert_eq!(err.context(), "s3 get_object");
        assert!(files.fetch_and_parse("k.json").await.is_empty());
    }
}
