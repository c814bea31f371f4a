//! Latency service models.
//!
//! Contains the dataset record, the validated metrics query and the
//! per-region result types returned by the metrics endpoint.

use serde::{Deserialize, Serialize, Serializer};

/// One observation from the dataset.
///
/// Fields are optional because the dataset is produced elsewhere: a record
/// without a region matches nothing, a record without a usable latency is
/// left out of latency statistics, and a missing uptime counts as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub region: Option<String>,
    pub latency: Option<f64>,
    pub uptime: Option<f64>,
}

impl Record {
    pub fn new(region: &str, latency: Option<f64>, uptime: Option<f64>) -> Self {
        Self {
            region: Some(region.to_string()),
            latency,
            uptime,
        }
    }
}

/// Raw metrics request body, as sent by clients.
///
/// `threshold` is accepted as an alias of `threshold_ms` for older clients.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsRequest {
    pub regions: Vec<String>,

    #[serde(alias = "threshold")]
    pub threshold_ms: f64,
}

/// Validated metrics query.
///
/// Only constructible from a [`MetricsRequest`] that has at least one region
/// and a finite threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsQuery {
    regions: Vec<String>,
    threshold_ms: f64,
}

impl MetricsQuery {
    pub fn new(regions: Vec<String>, threshold_ms: f64) -> Result<Self, String> {
        if regions.is_empty() {
            return Err("regions must contain at least one region".to_string());
        }

        if !threshold_ms.is_finite() {
            return Err(format!(
                "threshold_ms must be a finite number, got {}",
                threshold_ms
            ));
        }

        Ok(Self {
            regions,
            threshold_ms,
        })
    }

    /// Requested regions, in request order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn threshold_ms(&self) -> f64 {
        self.threshold_ms
    }
}

impl TryFrom<MetricsRequest> for MetricsQuery {
    type Error = String;

    fn try_from(request: MetricsRequest) -> Result<Self, Self::Error> {
        Self::new(request.regions, request.threshold_ms)
    }
}

/// Why a region has no statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionDataError {
    /// No record carries the requested region.
    NoRegionData,

    /// Records match the region but none has a usable latency.
    NoValidLatencyData,
}

impl RegionDataError {
    pub fn message(&self) -> &'static str {
        match self {
            RegionDataError::NoRegionData => "No data found for this region.",
            RegionDataError::NoValidLatencyData => "No valid latency data found for this region.",
        }
    }
}

impl Serialize for RegionDataError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Statistics computed for one region. Floats are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub region: String,
    pub avg_latency: f64,
    pub avg_uptime: f64,
    pub p95_latency: f64,
    pub breaches: u64,
}

/// Result for one requested region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegionMetrics {
    Computed(RegionStats),
    Unavailable {
        region: String,
        error: RegionDataError,
    },
}

impl RegionMetrics {
    pub fn region(&self) -> &str {
        match self {
            RegionMetrics::Computed(stats) => &stats.region,
            RegionMetrics::Unavailable { region, .. } => region,
        }
    }
}

/// Metrics endpoint response body.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub metrics: Vec<RegionMetrics>,
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Dataset file availability.
    pub dataset: &'static str,

    /// Error message (generic, no filesystem details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
