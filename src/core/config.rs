use std::collections::HashMap;
use std::env;
use std::io::Read;

use tracing::debug;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Where configuration and credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Running inside AWS Lambda; credentials are resolved from a secret.
    Lambda,
    /// Running on a workstation; credentials come from `DATABASE_URL`, and
    /// variables missing from the environment are read from a `.env` file.
    Local,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub deployment: Deployment,
    pub db_secret_id: Option<String>,
    pub database_url: Option<String>,
    pub db_name: Option<String>,
    pub db_instance_identifier: Option<String>,
    pub db_connect_timeout_ms: u64,
    pub s3_bucket: String,
    pub s3_region: Option<String>,
}

impl AppConfig {
    /// Reads the process environment. Outside Lambda a `.env` file in the
    /// working directory (or a parent) fills in what the environment lacks.
    pub fn from_env() -> Result<Self, String> {
        if env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some() {
            return Self::from_lookup(|key| env::var(key).ok());
        }
        let file = dotenv_vars(dotenvy::dotenv_iter());
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let deployment = if var("AWS_LAMBDA_FUNCTION_NAME").is_some() {
            Deployment::Lambda
        } else {
            Deployment::Local
        };

        let db_secret_id = var("SECRET_ARN");
        let database_url = var("DATABASE_URL");
        match deployment {
            Deployment::Lambda if db_secret_id.is_none() => {
                return Err("SECRET_ARN: must be set when running in Lambda".to_string());
            }
            Deployment::Local if database_url.is_none() && db_secret_id.is_none() => {
                return Err("DATABASE_URL: must be set when running locally".to_string());
            }
            _ => {}
        }

        let db_connect_timeout_ms = match var("DB_CONNECT_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("DB_CONNECT_TIMEOUT_MS: {}", e))?,
            None => DEFAULT_CONNECT_TIMEOUT_MS,
        };

        Ok(Self {
            deployment,
            db_secret_id,
            database_url,
            db_name: var("DB_NAME"),
            db_instance_identifier: var("DB_INSTANCE_IDENTIFIER"),
            db_connect_timeout_ms,
            s3_bucket: var("S3_BUCKET").ok_or_else(|| "S3_BUCKET: not set".to_string())?,
            s3_region: var("S3_REGION"),
        })
    }
}

/// Collects a `.env` file without touching the process environment. A
/// missing file yields nothing; malformed lines are skipped.
fn dotenv_vars<R: Read>(
    file: Result<dotenvy::Iter<R>, dotenvy::Error>,
) -> HashMap<String, String> {
    match file {
        Ok(lines) => lines.filter_map(Result::ok).collect(),
        Err(e) => {
            debug!("No .env file loaded: {}", e);
            HashMap::new()
        }
    }
}
