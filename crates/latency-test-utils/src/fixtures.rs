//! Dataset fixtures.
//!
//! Expected statistics for `SAMPLE_DATASET` (threshold 180):
//!
//! | region | avg_latency | avg_uptime | p95_latency | breaches |
//! |--------|-------------|------------|-------------|----------|
//! | apac   | 150.0       | 98.0       | 195.0       | 1        |
//! | emea   | 190.0       | 66.33      | 200.0       | 2        |
//! | amer   | no valid latency                                    |

/// Mixed-region dataset, deliberately unordered by region.
///
/// The second `emea` record lacks uptime (counts as 0) and the `amer`
/// records have no usable latency.
pub const SAMPLE_DATASET: &str = r#"[
  {"region": "emea", "service": "checkout", "latency": 170.0, "uptime": 99.0, "timestamp": 20250301},
  {"region": "apac", "service": "catalog", "latency": 100.0, "uptime": 99.0, "timestamp": 20250301},
  {"region": "amer", "service": "catalog", "uptime": 97.5, "timestamp": 20250301},
  {"region": "emea", "service": "catalog", "latency": 200.0, "timestamp": 20250302},
  {"region": "apac", "service": "checkout", "latency": 200.0, "uptime": 97.0, "timestamp": 20250302},
  {"region": "amer", "service": "checkout", "latency": null, "uptime": 98.5, "timestamp": 20250302},
  {"region": "emea", "service": "payments", "latency": 200.0, "uptime": 100.0, "timestamp": 20250303}
]"#;

/// The same observations as `SAMPLE_DATASET` for `apac`, using the
/// `latency_ms` / `uptime_pct` producer schema.
pub const SUFFIXED_DATASET: &str = r#"[
  {"region": "apac", "latency_ms": 100.0, "uptime_pct": 99.0},
  {"region": "apac", "latency_ms": 200.0, "uptime_pct": 97.0}
]"#;

/// Not JSON at all.
pub const MALFORMED_DATASET: &str = "region,latency,uptime\napac,100,99\n";
