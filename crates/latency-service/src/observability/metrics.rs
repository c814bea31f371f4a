//! Metrics definitions for the latency service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `latency_` prefix for this service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: 5 values (known paths plus `/other`)
//! - `status`: bounded by code (success, error, timeout, not_found, parse_error)
//! - `outcome`: 3 values (ok, no_data, no_valid_latency)
//!
//! Region names never appear as labels; they come from request bodies.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("latency_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Dataset reads are local file I/O plus JSON parsing
        .set_buckets_for_metric(
            Matcher::Prefix("latency_dataset_load".to_string()),
            &[
                0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500,
            ],
        )
        .map_err(|e| format!("Failed to set dataset load buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `latency_http_requests_total`, `latency_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// Captures framework-level rejections (404, 405, 415) as well as handler
/// responses.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("latency_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("latency_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/vercel" => "/vercel",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "/other",
    }
}

// ============================================================================
// Dataset Metrics
// ============================================================================

/// Record a dataset load attempt.
///
/// Metric: `latency_dataset_load_duration_seconds`, `latency_dataset_loads_total`
/// Labels: `status` ("success", "not_found", "parse_error")
pub fn record_dataset_load(status: &'static str, duration: Duration) {
    histogram!("latency_dataset_load_duration_seconds").record(duration.as_secs_f64());

    counter!("latency_dataset_loads_total",
        "status" => status
    )
    .increment(1);
}

// ============================================================================
// Region Metrics
// ============================================================================

/// Record the outcome of summarizing one requested region.
///
/// Metric: `latency_region_results_total`
/// Labels: `outcome` ("ok", "no_data", "no_valid_latency")
pub fn record_region_result(outcome: &'static str) {
    counter!("latency_region_results_total",
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    // Recording without an installed recorder is a no-op; these calls only
    // exercise the code paths. Value checks use a thread-local recorder.

    #[test]
    fn test_record_http_request() {
        record_http_request("POST", "/vercel", 200, Duration::from_millis(5));
        record_http_request("POST", "/vercel", 400, Duration::from_millis(1));
        record_http_request("POST", "/vercel", 500, Duration::from_millis(2));
        record_http_request("GET", "/health", 200, Duration::from_millis(1));
        record_http_request("GET", "/unknown", 404, Duration::from_millis(1));
        record_http_request("POST", "/vercel", 408, Duration::from_secs(30));
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(299), "success");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(404), "error");
        assert_eq!(categorize_status_code(500), "error");
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("/vercel"), "/vercel");
        assert_eq!(normalize_endpoint("/health"), "/health");
        assert_eq!(normalize_endpoint("/ready"), "/ready");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
        assert_eq!(normalize_endpoint("/vercel/extra"), "/other");
        assert_eq!(normalize_endpoint("/api/latency"), "/other");
    }

    #[test]
    fn test_region_and_dataset_metrics_are_recorded() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_region_result("ok");
            record_region_result("ok");
            record_region_result("no_data");
            record_dataset_load("success", Duration::from_millis(3));
        });

        let snapshot = snapshotter.snapshot().into_vec();

        let counter_value = |name: &str, label: (&str, &str)| {
            snapshot.iter().find_map(|(key, _, _, value)| {
                let key = key.key();
                let matches = key.name() == name
                    && key
                        .labels()
                        .any(|l| l.key() == label.0 && l.value() == label.1);
                match (matches, value) {
                    (true, DebugValue::Counter(count)) => Some(*count),
                    _ => None,
                }
            })
        };

        assert_eq!(
            counter_value("latency_region_results_total", ("outcome", "ok")),
            Some(2)
        );
        assert_eq!(
            counter_value("latency_region_results_total", ("outcome", "no_data")),
            Some(1)
        );
        assert_eq!(
            counter_value("latency_dataset_loads_total", ("status", "success")),
            Some(1)
        );
    }
}
