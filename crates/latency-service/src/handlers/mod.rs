//! HTTP request handlers for the latency service.

pub mod health;
pub mod latency;
pub mod metrics;

pub use health::{health_check, readiness_check};
pub use latency::region_metrics;
pub use metrics::metrics_handler;
