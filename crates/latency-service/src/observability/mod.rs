//! Observability module for the latency service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
