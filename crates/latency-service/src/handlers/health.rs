//! Health check handlers.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - checks that the dataset file is present

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Does NOT check the dataset; failure means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Returns 200 when the configured dataset file exists, 503 otherwise. The
/// file is not parsed here; a malformed dataset still surfaces as a 500 on
/// the metrics endpoint.
///
/// The path is logged server-side only.
#[tracing::instrument(skip_all, name = "latency.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dataset = state.calculator.dataset();

    if !dataset.is_available() {
        tracing::warn!(
            path = %dataset.path().display(),
            "Readiness check failed: dataset file not available"
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                dataset: "unavailable",
                error: Some("Dataset unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            dataset: "available",
            error: None,
        }),
    )
}
