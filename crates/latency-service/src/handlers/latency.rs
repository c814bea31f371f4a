//! Region latency metrics handler.
//!
//! `POST /vercel` takes `{"regions": [...], "threshold_ms": n}` and returns
//! `{"metrics": [...]}` with one entry per requested region.

use crate::errors::LatencyError;
use crate::models::{MetricsQuery, MetricsRequest, MetricsResponse};
use crate::routes::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::{instrument, Span};

/// Compute per-region latency metrics.
///
/// ## Request Body
///
/// ```json
/// { "regions": ["apac", "emea"], "threshold_ms": 180 }
/// ```
///
/// `threshold` is accepted in place of `threshold_ms`.
///
/// ## Response
///
/// - 200 with `{"metrics": [...]}`, in request order. Regions without data
///   carry an `error` string instead of statistics.
/// - 400 with `{"error": ...}` if the body is not a valid query.
/// - 500 with `{"error": ...}` if the dataset is missing or malformed.
#[instrument(skip_all, name = "latency.metrics.query")]
pub async fn region_metrics(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MetricsRequest>, JsonRejection>,
) -> Result<Json<MetricsResponse>, LatencyError> {
    let Json(request) =
        payload.map_err(|rejection| LatencyError::BadRequest(rejection.body_text()))?;
    let query = MetricsQuery::try_from(request).map_err(LatencyError::BadRequest)?;

    tracing::debug!(
        regions = query.regions().len(),
        threshold_ms = query.threshold_ms(),
        "Computing region metrics"
    );

    // File read and aggregation are blocking; keep them off the async workers.
    let calculator = state.calculator.clone();
    let span = Span::current();
    let metrics =
        tokio::task::spawn_blocking(move || span.in_scope(|| calculator.calculate(&query)))
            .await
            .map_err(|e| LatencyError::Internal(format!("metrics task failed: {}", e)))??;

    Ok(Json(MetricsResponse { metrics }))
}
