//! Per-region latency and uptime statistics.
//!
//! Each requested region is summarized independently:
//!
//! 1. Records are filtered by exact region match.
//! 2. No match yields a "no data" entry for that region only.
//! 3. Latency statistics use records with a usable latency; if there are none
//!    the region gets a "no valid latency" entry.
//! 4. Uptime is averaged over every matching record, missing uptime counting
//!    as 0.
//!
//! All floats in the output are rounded to 2 decimal places.

use crate::errors::LatencyError;
use crate::models::{MetricsQuery, Record, RegionDataError, RegionMetrics, RegionStats};
use crate::observability::metrics;
use crate::repositories::DatasetRepository;
use tracing::instrument;

/// Percentile reported as `p95_latency`.
pub const P95: f64 = 95.0;

/// Computes region metrics from the dataset it was constructed with.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    dataset: DatasetRepository,
}

impl MetricsCalculator {
    pub fn new(dataset: DatasetRepository) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &DatasetRepository {
        &self.dataset
    }

    /// Load the dataset and summarize every requested region.
    ///
    /// Dataset failures abort the whole calculation; region-level problems
    /// are reported inside the returned metrics.
    ///
    /// Blocking: reads the dataset file synchronously.
    #[instrument(
        skip_all,
        name = "latency.service.calculate",
        fields(regions = query.regions().len())
    )]
    pub fn calculate(&self, query: &MetricsQuery) -> Result<Vec<RegionMetrics>, LatencyError> {
        let records = self.dataset.load()?;
        Ok(summarize(&records, query))
    }
}

/// Summarize `records` for each region of `query`, in query order.
pub fn summarize(records: &[Record], query: &MetricsQuery) -> Vec<RegionMetrics> {
    query
        .regions()
        .iter()
        .map(|region| {
            let result = region_metrics(records, region, query.threshold_ms());
            metrics::record_region_result(outcome(&result));
            result
        })
        .collect()
}

/// Compute the metrics of a single region.
pub fn region_metrics(records: &[Record], region: &str, threshold_ms: f64) -> RegionMetrics {
    let matching: Vec<&Record> = records
        .iter()
        .filter(|record| record.region.as_deref() == Some(region))
        .collect();

    if matching.is_empty() {
        return unavailable(region, RegionDataError::NoRegionData);
    }

    let mut latencies: Vec<f64> = matching.iter().filter_map(|record| record.latency).collect();

    if latencies.is_empty() {
        tracing::debug!(region, records = matching.len(), "No usable latency values");
        return unavailable(region, RegionDataError::NoValidLatencyData);
    }

    latencies.sort_by(f64::total_cmp);

    let breaches = latencies
        .iter()
        .filter(|&&latency| latency > threshold_ms)
        .count() as u64;

    let uptimes: Vec<f64> = matching
        .iter()
        .map(|record| record.uptime.unwrap_or(0.0))
        .collect();

    RegionMetrics::Computed(RegionStats {
        region: region.to_string(),
        avg_latency: round2(mean(&latencies)),
        avg_uptime: round2(mean(&uptimes)),
        p95_latency: round2(percentile_sorted(&latencies, P95)),
        breaches,
    })
}

fn unavailable(region: &str, error: RegionDataError) -> RegionMetrics {
    RegionMetrics::Unavailable {
        region: region.to_string(),
        error,
    }
}

fn outcome(result: &RegionMetrics) -> &'static str {
    match result {
        RegionMetrics::Computed(_) => "ok",
        RegionMetrics::Unavailable {
            error: RegionDataError::NoRegionData,
            ..
        } => "no_data",
        RegionMetrics::Unavailable {
            error: RegionDataError::NoValidLatencyData,
            ..
        } => "no_valid_latency",
    }
}

/// Arithmetic mean; 0 for an empty slice.
///
/// Finite inputs always give a finite mean, even when their sum overflows.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / count;
    }
    values.iter().map(|value| value / count).sum()
}

/// Percentile of an ascending slice using linear interpolation between the
/// nearest ranks: rank `p/100 * (n - 1)`.
///
/// Returns 0 for an empty slice.
pub fn percentile_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0.0;
    };

    let rank = (percentile / 100.0).clamp(0.0, 1.0) * last as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(last);
    let fraction = rank - lower_idx as f64;

    match (sorted.get(lower_idx), sorted.get(upper_idx)) {
        (Some(lower), Some(upper)) => lower * (1.0 - fraction) + upper * fraction,
        _ => 0.0,
    }
}

/// Round to 2 decimal places, half away from zero. Never returns `-0.0`.
///
/// Magnitudes too large to scale have no fractional digits and pass through.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0 + 0.0
}
