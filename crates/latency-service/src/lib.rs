//! Latency Service Library
//!
//! Serves per-region latency and uptime statistics computed from a static
//! JSON dataset:
//!
//! - Average latency, p95 latency and threshold breaches per region
//! - Average uptime per region
//! - Per-region "no data" markers that never fail the whole request
//!
//! # Architecture
//!
//! Handler -> Service -> Repository:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Records, queries and region results
//! - `observability` - Prometheus metrics
//! - `repositories` - Dataset loading
//! - `routes` - Axum router setup
//! - `services` - Metrics calculation

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
