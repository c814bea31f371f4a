//! Latency service configuration.
//!
//! Configuration is loaded from environment variables once at startup and
//! passed explicitly into the router and the components it builds.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "q-vercel-latency.json";

/// Default JSON key holding a record's latency in milliseconds.
pub const DEFAULT_LATENCY_FIELD: &str = "latency";

/// Default JSON key holding a record's uptime percentage.
pub const DEFAULT_UPTIME_FIELD: &str = "uptime";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Which JSON keys of a dataset record carry latency and uptime.
///
/// The canonical schema is `latency` / `uptime`. Producers emitting
/// `latency_ms` / `uptime_pct` are supported by configuring the mapping
/// explicitly; the loader never falls back from one name to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub latency: String,
    pub uptime: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY_FIELD.to_string(),
            uptime: DEFAULT_UPTIME_FIELD.to_string(),
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`: any origin.
    Any,
    /// An explicit allow-list.
    List(Vec<String>),
}

/// Latency service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Path of the JSON dataset read on every metrics request.
    pub dataset_path: PathBuf,

    /// Record field names used when reading the dataset.
    pub field_mapping: FieldMapping,

    /// Origins allowed by the CORS layer (default: any).
    pub cors_origins: CorsOrigins,

    /// Per-request timeout in seconds (default: 30).
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid dataset configuration: {0}")]
    InvalidDataset(String),

    #[error("Invalid CORS configuration: {0}")]
    InvalidCors(String),

    #[error("Invalid request timeout configuration: {0}")]
    InvalidRequestTimeout(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let dataset_path = non_empty(vars, "DATASET_PATH", DEFAULT_DATASET_PATH)?;
        let latency = non_empty(vars, "DATASET_LATENCY_FIELD", DEFAULT_LATENCY_FIELD)?;
        let uptime = non_empty(vars, "DATASET_UPTIME_FIELD", DEFAULT_UPTIME_FIELD)?;

        if latency == uptime {
            return Err(ConfigError::InvalidDataset(format!(
                "DATASET_LATENCY_FIELD and DATASET_UPTIME_FIELD must differ, both are '{}'",
                latency
            )));
        }

        let cors_origins = match vars.get("CORS_ALLOWED_ORIGINS") {
            Some(value) => parse_cors_origins(value)?,
            None => CorsOrigins::Any,
        };

        let request_timeout_seconds = if let Some(value_str) = vars.get("REQUEST_TIMEOUT_SECONDS")
        {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidRequestTimeout(format!(
                    "REQUEST_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidRequestTimeout(
                    "REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_REQUEST_TIMEOUT_SECONDS
        };

        Ok(Config {
            bind_address,
            dataset_path: PathBuf::from(dataset_path),
            field_mapping: FieldMapping { latency, uptime },
            cors_origins,
            request_timeout_seconds,
        })
    }
}

fn non_empty(
    vars: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match vars.get(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidDataset(format!(
            "{} must not be empty",
            key
        ))),
        Some(value) => Ok(value.trim().to_string()),
        None => Ok(default.to_string()),
    }
}

fn parse_cors_origins(value: &str) -> Result<CorsOrigins, ConfigError> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        return Err(ConfigError::InvalidCors(
            "CORS_ALLOWED_ORIGINS must list at least one origin".to_string(),
        ));
    }

    if origins.iter().any(|origin| origin == "*") {
        return Ok(CorsOrigins::Any);
    }

    if let Some(bad) = origins
        .iter()
        .find(|origin| axum::http::HeaderValue::from_str(origin).is_err())
    {
        return Err(ConfigError::InvalidCors(format!(
            "CORS_ALLOWED_ORIGINS contains an invalid origin: '{}'",
            bad
        )));
    }

    Ok(CorsOrigins::List(origins))
}
