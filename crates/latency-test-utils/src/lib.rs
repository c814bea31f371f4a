//! # Latency Test Utilities
//!
//! Shared test utilities for the latency service.
//!
//! This crate provides:
//! - Server test harness (`TestLatencyServer` for E2E tests)
//! - Dataset fixtures (`fixtures`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use latency_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestLatencyServer::spawn(fixtures::SAMPLE_DATASET).await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .post(format!("{}/vercel", server.url()))
//!         .json(&serde_json::json!({"regions": ["apac"], "threshold_ms": 180}))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
