//! Dataset repository.
//!
//! Reads the latency dataset from a JSON file. The file must hold an array of
//! objects; anything else fails the whole load. Inside an object, fields are
//! read through the configured [`FieldMapping`] and missing or mistyped
//! values are kept as `None` so the calculator can apply its own policy.

use crate::config::FieldMapping;
use crate::models::Record;
use crate::observability::metrics;
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

/// Dataset load failure. Loads are all-or-nothing.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file {} not found or unreadable: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dataset file {} is not valid: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

impl DatasetError {
    /// Label used for the `status` dimension of dataset load metrics.
    fn metric_status(&self) -> &'static str {
        match self {
            DatasetError::NotFound { .. } => "not_found",
            DatasetError::Parse { .. } => "parse_error",
        }
    }
}

/// Dataset repository bound to one file and one field mapping.
#[derive(Debug, Clone)]
pub struct DatasetRepository {
    path: PathBuf,
    mapping: FieldMapping,
}

impl DatasetRepository {
    pub fn new(path: impl Into<PathBuf>, mapping: FieldMapping) -> Self {
        Self {
            path: path.into(),
            mapping,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the dataset file currently exists as a regular file.
    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the whole dataset.
    ///
    /// Blocking: callers on the async runtime go through `spawn_blocking`.
    #[instrument(skip_all, name = "latency.repo.load_dataset", fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Vec<Record>, DatasetError> {
        let start = Instant::now();

        let result = std::fs::read(&self.path)
            .map_err(|source| DatasetError::NotFound {
                path: self.path.clone(),
                source,
            })
            .and_then(|bytes| parse_records(&bytes, &self.mapping, &self.path));

        let duration = start.elapsed();
        match &result {
            Ok(records) => {
                metrics::record_dataset_load("success", duration);
                tracing::debug!(records = records.len(), "Dataset loaded");
            }
            Err(e) => {
                metrics::record_dataset_load(e.metric_status(), duration);
                tracing::warn!(error = %e, "Dataset load failed");
            }
        }

        result
    }
}

/// Parse dataset bytes into records using the given field mapping.
pub fn parse_records(
    bytes: &[u8],
    mapping: &FieldMapping,
    path: &Path,
) -> Result<Vec<Record>, DatasetError> {
    let parse_error = |reason: String| DatasetError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| parse_error(e.to_string()))?;

    let entries = match document {
        Value::Array(entries) => entries,
        other => {
            return Err(parse_error(format!(
                "expected a JSON array of records, found {}",
                kind_of(&other)
            )))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => Ok(to_record(fields, mapping)),
            other => Err(parse_error(format!(
                "record {} must be a JSON object, found {}",
                index,
                kind_of(other)
            ))),
        })
        .collect()
}

fn to_record(fields: &Map<String, Value>, mapping: &FieldMapping) -> Record {
    Record {
        region: fields
            .get("region")
            .and_then(Value::as_str)
            .map(str::to_string),
        latency: number(fields, &mapping.latency),
        uptime: number(fields, &mapping.uptime),
    }
}

// Numeric strings are not coerced.
fn number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
