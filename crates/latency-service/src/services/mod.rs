//! Service layer for the latency service.
//!
//! # Components
//!
//! - `metrics_calculator` - Per-region latency/uptime statistics over the dataset

pub mod metrics_calculator;

pub use metrics_calculator::MetricsCalculator;
