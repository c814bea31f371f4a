//! Prometheus metrics endpoint handler.
//!
//! Unauthenticated so Prometheus can scrape it. Labels carry no request
//! data (region names are never used as labels).

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns 200 OK with Prometheus text format:
/// ```text
/// # TYPE latency_region_results_total counter
/// latency_region_results_total{outcome="ok"} 42
/// ```
#[tracing::instrument(skip_all, name = "latency.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
