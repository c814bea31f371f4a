//! Test server harness for E2E testing
//!
//! Provides `TestLatencyServer` for spawning real latency service instances
//! in tests, each with its own dataset file in a temporary directory.

use latency_service::config::Config;
use latency_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// File name of the dataset inside the server's temporary directory.
pub const DATASET_FILE_NAME: &str = "q-vercel-latency.json";

/// Test harness for spawning the latency service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_e2e() -> Result<(), anyhow::Error> {
///     let server = TestLatencyServer::spawn("[]").await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestLatencyServer {
    addr: SocketAddr,
    config: Config,
    dataset_dir: TempDir,
    _handle: JoinHandle<()>,
}

impl TestLatencyServer {
    /// Spawn a server whose dataset file holds `dataset`.
    pub async fn spawn(dataset: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with(Some(dataset), HashMap::new()).await
    }

    /// Spawn a server whose configured dataset file does not exist.
    pub async fn spawn_without_dataset() -> Result<Self, anyhow::Error> {
        Self::spawn_with(None, HashMap::new()).await
    }

    /// Spawn a server with extra environment-style configuration.
    ///
    /// `DATASET_PATH` and `BIND_ADDRESS` are always set by the harness.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with(
        dataset: Option<&str>,
        mut vars: HashMap<String, String>,
    ) -> Result<Self, anyhow::Error> {
        let dataset_dir = tempfile::tempdir()
            .map_err(|e| anyhow::anyhow!("Failed to create dataset directory: {}", e))?;
        let dataset_path = dataset_dir.path().join(DATASET_FILE_NAME);

        if let Some(contents) = dataset {
            std::fs::write(&dataset_path, contents)
                .map_err(|e| anyhow::anyhow!("Failed to write dataset: {}", e))?;
        }

        vars.insert(
            "DATASET_PATH".to_string(),
            dataset_path.display().to_string(),
        );
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string());

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        // The global recorder belongs to the binary; tests get a standalone one.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let state = Arc::new(AppState::from_config(config.clone()));
        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            dataset_dir,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the dataset file the server reads.
    pub fn dataset_path(&self) -> PathBuf {
        self.dataset_dir.path().join(DATASET_FILE_NAME)
    }

    /// Replace the dataset contents. The next request sees the new data.
    pub fn write_dataset(&self, contents: &str) -> Result<(), anyhow::Error> {
        std::fs::write(self.dataset_path(), contents)
            .map_err(|e| anyhow::anyhow!("Failed to write dataset: {}", e))
    }

    /// Delete the dataset file.
    pub fn remove_dataset(&self) -> Result<(), anyhow::Error> {
        remove_if_present(&self.dataset_path())
    }

    /// POST a metrics query and return the response.
    pub async fn post_metrics(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, anyhow::Error> {
        reqwest::Client::new()
            .post(format!("{}/vercel", self.url()))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Metrics request failed: {}", e))
    }
}

fn remove_if_present(path: &Path) -> Result<(), anyhow::Error> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::anyhow!("Failed to remove dataset: {}", e)),
    }
}

impl Drop for TestLatencyServer {
    fn drop(&mut self) {
        // Stop the server before the dataset directory is removed.
        self._handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_spawns_successfully() -> Result<(), anyhow::Error> {
        let server = TestLatencyServer::spawn("[]").await?;

        assert!(server.url().starts_with("http://127.0.0.1:"));

        let response = reqwest::get(format!("{}/health", server.url())).await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await?, "OK");

        Ok(())
    }

    #[tokio::test]
    async fn test_server_provides_addr() -> Result<(), anyhow::Error> {
        let server = TestLatencyServer::spawn("[]").await?;

        let addr = server.addr();
        assert!(addr.ip().is_loopback());
        assert!(addr.port() > 0);
        assert_eq!(server.url(), format!("http://{}", addr));

        Ok(())
    }

    #[tokio::test]
    async fn test_server_config_points_at_dataset() -> Result<(), anyhow::Error> {
        let server = TestLatencyServer::spawn("[]").await?;

        assert_eq!(server.config().dataset_path, server.dataset_path());
        assert!(server.dataset_path().is_file());

        Ok(())
    }

    #[tokio::test]
    async fn test_spawn_without_dataset_has_no_file() -> Result<(), anyhow::Error> {
        let server = TestLatencyServer::spawn_without_dataset().await?;

        assert!(!server.dataset_path().exists());
        // Removing a missing dataset is not an error
        server.remove_dataset()?;

        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_servers_different_ports() -> Result<(), anyhow::Error> {
        let server1 = TestLatencyServer::spawn("[]").await?;
        let server2 = TestLatencyServer::spawn("[]").await?;

        assert_ne!(server1.addr(), server2.addr());
        assert_ne!(server1.dataset_path(), server2.dataset_path());

        Ok(())
    }
}
