//! Tier classification with fixed threshold tables.
//!
//! Thresholds are constants, not runtime configuration. A value exactly
//! at a WARN/FAIL boundary belongs to the worse tier; missing/unknown
//! values classify as FAIL so a broken probe can never improve the
//! verdict.

use crate::extract::{Metric, MetricKind, MetricValue};
use serde::Serialize;

/// Quality bucket for a single metric. Ordered by severity, so
/// worst-case aggregation is a plain `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Pass,
    Warn,
    Fail,
}

/// WARN starts at `warn_at`, FAIL at `fail_at`; both half-open.
fn banded(value: f64, warn_at: f64, fail_at: f64) -> Tier {
    if value < warn_at {
        Tier::Pass
    } else if value < fail_at {
        Tier::Warn
    } else {
        Tier::Fail
    }
}

/// Pure classification: same metric in, same tier out.
pub fn classify(metric: &Metric) -> Tier {
    match (metric.kind, &metric.value) {
        (_, MetricValue::Unknown) => Tier::Fail,
        (MetricKind::PacketLoss, MetricValue::Float(v)) => {
            if *v <= 0.0 {
                Tier::Pass
            } else if *v < 2.0 {
                Tier::Warn
            } else {
                Tier::Fail
            }
        }
        (MetricKind::AvgLatency, MetricValue::Float(v)) => banded(*v, 50.0, 150.0),
        (MetricKind::MaxLatency, MetricValue::Float(v)) => banded(*v, 100.0, 200.0),
        (MetricKind::Jitter, MetricValue::Float(v)) => banded(*v, 10.0, 30.0),
        (MetricKind::HopCount, MetricValue::Count(n)) => banded(*n as f64, 10.0, 15.0),
        (MetricKind::DnsResolved, MetricValue::Bool(b))
        | (MetricKind::PublicIp, MetricValue::Bool(b)) => {
            if *b {
                Tier::Pass
            } else {
                Tier::Fail
            }
        }
        // Value type does not match the metric kind: upstream defect,
        // classify conservatively.
        _ => Tier::Fail,
    }
}

/// Per-sample latency tier for the live stream, using the avg-latency
/// thresholds.
pub fn classify_sample_rtt(rtt_ms: f64) -> Tier {
    banded(rtt_ms, 50.0, 150.0)
}
