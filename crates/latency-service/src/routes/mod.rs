//! HTTP routes for the latency service.
//!
//! Defines the Axum router and application state.

use crate::config::{Config, CorsOrigins};
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::repositories::DatasetRepository;
use crate::services::MetricsCalculator;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across all handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Region metrics calculator bound to the configured dataset.
    pub calculator: MetricsCalculator,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let dataset = DatasetRepository::new(
            config.dataset_path.clone(),
            config.field_mapping.clone(),
        );
        Self {
            calculator: MetricsCalculator::new(dataset),
            config,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `POST /vercel` - Per-region latency metrics
/// - `/health` - Liveness probe (simple "OK")
/// - `/ready` - Readiness probe (dataset file present)
/// - `/metrics` - Prometheus metrics endpoint
/// - TraceLayer for request logging
/// - Configurable request timeout
/// - CORS from configuration
/// - HTTP metrics middleware
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);
    let cors = cors_layer(&state.config.cors_origins);

    let api_routes = Router::new()
        .route("/vercel", post(handlers::region_metrics))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflights, decorate responses
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    api_routes
        .merge(metrics_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// CORS policy: configured origins, any method, any header. Credentials are
/// not allowed, which is what makes the `*` origin legal.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        // Origins are validated as header values when the config is loaded
        CorsOrigins::List(list) => AllowOrigin::list(
            list.iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        ),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn app(vars: HashMap<String, String>) -> Router {
        let config = Config::from_vars(&vars).unwrap();
        let handle = PrometheusBuilder::new().build_recorder().handle();
        build_routes(Arc::new(AppState::from_config(config)), handle)
    }

    fn app_with_dataset(contents: &str) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latency.json");
        std::fs::write(&path, contents).unwrap();
        let vars = HashMap::from([(
            "DATASET_PATH".to_string(),
            path.display().to_string(),
        )]);
        (app(vars), dir)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/vercel")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_state_is_clone() {
        // Required for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_vercel_route_computes_metrics() {
        let (app, _dir) = app_with_dataset(
            r#"[{"region": "amer", "latency": 120, "uptime": 99}, {"region": "amer", "latency": 180, "uptime": 97}]"#,
        );

        let response = app
            .oneshot(post_json(r#"{"regions": ["amer"], "threshold_ms": 150}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["metrics"][0]["avg_latency"], 150.0);
        assert_eq!(json["metrics"][0]["avg_uptime"], 98.0);
        assert_eq!(json["metrics"][0]["p95_latency"], 177.0);
        assert_eq!(json["metrics"][0]["breaches"], 1);
    }

    #[tokio::test]
    async fn test_vercel_route_rejects_malformed_json_with_error_body() {
        let (app, _dir) = app_with_dataset("[]");

        let response = app.oneshot(post_json("{\"regions\": ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Bad request"));
    }

    #[tokio::test]
    async fn test_vercel_route_rejects_wrong_types() {
        let (app, _dir) = app_with_dataset("[]");

        let response = app
            .oneshot(post_json(r#"{"regions": "amer", "threshold_ms": 150}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin_by_default() {
        let (app, _dir) = app_with_dataset("[]");

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/vercel")
            .header(header::ORIGIN, "https://dashboard.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricted_origins() {
        let vars = HashMap::from([(
            "CORS_ALLOWED_ORIGINS".to_string(),
            "https://dashboard.example.com".to_string(),
        )]);
        let app = app(vars);

        let request = |origin: &str| {
            Request::builder()
                .method(Method::GET)
                .uri("/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app
            .clone()
            .oneshot(request("https://dashboard.example.com"))
            .await
            .unwrap();
        assert_eq!(
            allowed
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://dashboard.example.com"
        );

        let denied = app
            .oneshot(request("https://evil.example.com"))
            .await
            .unwrap();
        assert!(denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_metrics_route_renders() {
        let (app, _dir) = app_with_dataset("[]");

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
