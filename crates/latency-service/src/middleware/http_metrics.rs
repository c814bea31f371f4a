//! HTTP metrics middleware.
//!
//! Runs as the outermost layer so that responses produced by the framework
//! itself (unknown route, wrong method, rejected JSON body) are counted the
//! same way as handler responses.

use crate::observability::metrics::record_http_request;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Records method, normalized path, status and duration of every request.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = start.elapsed();
    record_http_request(method.as_str(), &path, status.as_u16(), elapsed);

    if status.is_server_error() {
        tracing::debug!(
            target: "latency.http",
            %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Request failed"
        );
    }

    response
}
