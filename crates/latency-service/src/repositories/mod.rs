//! Repository layer for the latency service.
//!
//! Follows the Handler -> Service -> Repository architecture. The only
//! backing store is the read-only JSON dataset.

pub mod dataset;

pub use dataset::{DatasetError, DatasetRepository};
