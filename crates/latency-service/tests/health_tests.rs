//! Health endpoint integration tests.
//!
//! Tests `/health`, `/ready` and `/metrics` using the `TestLatencyServer`
//! harness.

use latency_test_utils::{fixtures, TestLatencyServer};

/// Liveness does not depend on the dataset.
#[tokio::test]
async fn test_health_endpoint_returns_200_without_dataset() -> Result<(), anyhow::Error> {
    let server = TestLatencyServer::spawn_without_dataset().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_with_dataset() -> Result<(), anyhow::Error> {
    let server = TestLatencyServer::spawn(fixtures::SAMPLE_DATASET).await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert!(
        content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json")),
        "Expected application/json content type, got {:?}",
        content_type
    );

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["dataset"], "available");

    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_tracks_dataset_removal() -> Result<(), anyhow::Error> {
    let server = TestLatencyServer::spawn(fixtures::SAMPLE_DATASET).await?;
    server.remove_dataset()?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["error"], "Dataset unavailable");

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_returns_200() -> Result<(), anyhow::Error> {
    let server = TestLatencyServer::spawn("[]").await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), 200);

    Ok(())
}

/// Test that non-existent routes return 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestLatencyServer::spawn("[]").await?;

    let response = reqwest::get(format!("{}/v1/nonexistent", server.url())).await?;

    assert_eq!(response.status(), 404);

    Ok(())
}
