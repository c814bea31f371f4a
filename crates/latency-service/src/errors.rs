//! Latency service error types.
//!
//! Request-level failures map to HTTP status codes via the `IntoResponse`
//! impl and render as `{"error": "<message>"}`. Per-region problems are not
//! errors at this level; they travel inside the metrics payload.

use crate::repositories::DatasetError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Latency service error type.
///
/// Maps to HTTP status codes:
/// - DatasetNotFound, DatasetParse, Internal: 500 Internal Server Error
/// - BadRequest: 400 Bad Request
#[derive(Debug, Error)]
pub enum LatencyError {
    #[error("Dataset file not found: {path}")]
    DatasetNotFound { path: String },

    #[error("Dataset file {path} could not be parsed: {reason}")]
    DatasetParse { path: String, reason: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(String),
}

impl LatencyError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            LatencyError::DatasetNotFound { .. }
            | LatencyError::DatasetParse { .. }
            | LatencyError::Internal(_) => 500,
            LatencyError::BadRequest(_) => 400,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for LatencyError {
    fn into_response(self) -> Response {
        let status = match &self {
            LatencyError::DatasetNotFound { path } => {
                tracing::error!(target: "latency.dataset", path = %path, "Dataset file not found");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LatencyError::DatasetParse { path, reason } => {
                tracing::error!(
                    target: "latency.dataset",
                    path = %path,
                    reason = %reason,
                    "Dataset file could not be parsed"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LatencyError::BadRequest(reason) => {
                tracing::debug!(target: "latency.request", reason = %reason, "Rejected request");
                StatusCode::BAD_REQUEST
            }
            LatencyError::Internal(detail) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "latency.internal", error = %detail, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatasetError> for LatencyError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound { path, .. } => LatencyError::DatasetNotFound {
                path: path.display().to_string(),
            },
            DatasetError::Parse { path, reason } => LatencyError::DatasetParse {
                path: path.display().to_string(),
                reason,
            },
        }
    }
}
