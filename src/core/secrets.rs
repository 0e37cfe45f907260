//! Database credential resolution.
//!
//! In Lambda the credentials live in a secret; it is read through SSM
//! Parameter Store, which also fronts Secrets Manager under the
//! `/aws/reference/secretsmanager/` namespace. A secret without a host
//! names an RDS instance whose endpoint is looked up instead. Locally a
//! plain `DATABASE_URL` is used.

use std::time::Duration;

use aws_sdk_rds::Client as RdsClient;
use aws_sdk_ssm::Client as SsmClient;
use serde::Deserialize;
use tracing::info;

use super::config::{AppConfig, Deployment};
use crate::errors::StoreError;

const SECRETS_MANAGER_REFERENCE: &str = "/aws/reference/secretsmanager/";
const DEFAULT_PORT: u16 = 5432;

/// The JSON document stored in the database secret.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSecret {
    pub username: String,
    pub password: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub db_instance_identifier: Option<String>,
}

/// Network address of a database instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEndpoint {
    pub host: String,
    pub port: u16,
}

impl DatabaseSecret {
    /// The RDS instance to look up, if the secret carries no host. The
    /// secret's own identifier wins over `fallback`.
    #[must_use]
    pub fn lookup_identifier<'a>(&'a self, fallback: Option<&'a str>) -> Option<&'a str> {
        if self.host.is_some() {
            return None;
        }
        self.db_instance_identifier.as_deref().or(fallback)
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: DbEndpoint) -> Self {
        self.host = Some(endpoint.host);
        self.port = Some(endpoint.port);
        self
    }

    /// Turns the secret into a connection config. `fallback_db` is used when
    /// the secret names no database.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret carries no host or no database name can
    /// be determined.
    pub fn to_pg_config(
        &self,
        fallback_db: Option<&str>,
        connect_timeout: Duration,
    ) -> Result<postgres::Config, StoreError> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| StoreError::msg("Invalid database secret", "missing host"))?;
        let dbname = self
            .dbname
            .as_deref()
            .or(self.db_instance_identifier.as_deref())
            .or(fallback_db)
            .ok_or_else(|| StoreError::msg("Invalid database secret", "missing database name"))?;

        let mut config = postgres::Config::new();
        config
            .host(host)
            .port(self.port.unwrap_or(DEFAULT_PORT))
            .user(&self.username)
            .password(&self.password)
            .dbname(dbname)
            .connect_timeout(connect_timeout);
        Ok(config)
    }
}

/// Maps a secret id or ARN to the SSM parameter name that exposes it.
/// Names that already look like parameter paths are used as-is.
#[must_use]
pub fn secret_parameter_name(secret_id: &str) -> String {
    if secret_id.starts_with('/') {
        secret_id.to_string()
    } else {
        format!("{SECRETS_MANAGER_REFERENCE}{secret_id}")
    }
}

/// # Errors
///
/// Returns an error if the SSM call fails or the secret is not valid JSON.
pub async fn fetch_database_secret(secret_id: &str) -> Result<DatabaseSecret, StoreError> {
    let shared = aws_config::from_env().load().await;
    let client = SsmClient::new(&shared);
    let name = secret_parameter_name(secret_id);
    info!(parameter = %name, "Fetching database secret");

    let resp = client
        .get_parameter()
        .name(name)
        .with_decryption(true)
        .send()
        .await
        .map_err(|e| StoreError::new("ssm get_parameter", e))?;

    let value = resp
        .parameter
        .and_then(|p| p.value)
        .ok_or_else(|| StoreError::msg("ssm get_parameter", "secret has no value"))?;

    serde_json::from_str(&value).map_err(|e| StoreError::new("Invalid database secret", e))
}

/// Looks up the endpoint of an RDS instance.
///
/// # Errors
///
/// Returns an error if the RDS call fails or the instance has no usable endpoint.
pub async fn describe_db_endpoint(identifier: &str) -> Result<DbEndpoint, StoreError> {
    let shared = aws_config::from_env().load().await;
    let client = RdsClient::new(&shared);
    info!(instance = %identifier, "Looking up database endpoint");

    let resp = client
        .describe_db_instances()
        .db_instance_identifier(identifier)
        .send()
        .await
        .map_err(|e| StoreError::new("rds describe_db_instances", e))?;

    let endpoint = resp
        .db_instances()
        .first()
        .and_then(|instance| instance.endpoint())
        .ok_or_else(|| StoreError::msg("rds describe_db_instances", "instance has no endpoint"))?;
    let endpoint = endpoint_from_parts(endpoint.address(), endpoint.port())?;
    info!(host = %endpoint.host, port = endpoint.port, "Database endpoint resolved");
    Ok(endpoint)
}

fn endpoint_from_parts(address: Option<&str>, port: Option<i32>) -> Result<DbEndpoint, StoreError> {
    let host = address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| StoreError::msg("rds describe_db_instances", "endpoint has no address"))?;
    let port = match port {
        Some(p) => u16::try_from(p).map_err(|e| StoreError::new("rds describe_db_instances", e))?,
        None => DEFAULT_PORT,
    };
    Ok(DbEndpoint {
        host: host.to_string(),
        port,
    })
}

/// Resolves the connection config for the current deployment.
///
/// # Errors
///
/// Returns an error if neither source yields a usable configuration.
pub async fn resolve_pg_config(config: &AppConfig) -> Result<postgres::Config, StoreError> {
    let timeout = Duration::from_millis(config.db_connect_timeout_ms);

    if config.deployment == Deployment::Local
        && let Some(url) = &config.database_url
    {
        info!("Using DATABASE_URL for local execution");
        let mut pg = url
            .parse::<postgres::Config>()
            .map_err(|e| StoreError::new("Invalid DATABASE_URL", e))?;
        pg.connect_timeout(timeout);
        return Ok(pg);
    }

    let secret_id = config
        .db_secret_id
        .as_deref()
        .ok_or_else(|| StoreError::msg("Database configuration", "SECRET_ARN is not set"))?;
    let mut secret = fetch_database_secret(secret_id).await?;
    info!("Database secret retrieved");

    let fallback_identifier = config.db_instance_identifier.as_deref();
    if let Some(identifier) = secret.lookup_identifier(fallback_identifier).map(str::to_string) {
        let endpoint = describe_db_endpoint(&identifier).await?;
        secret = secret.with_endpoint(endpoint);
    }
    secret.to_pg_config(config.db_name.as_deref().or(fallback_identifier), timeout)
}
