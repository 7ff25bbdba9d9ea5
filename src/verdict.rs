//! Verdict aggregation: per-metric tiers into an overall readiness call.

use crate::classify::{classify, Tier};
use crate::extract::{Metric, MetricKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The destination being assessed. Immutable for a run.
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub host: String,
    pub label: Option<String>,
}

impl Target {
    pub fn new(host: impl Into<String>, label: Option<String>) -> Self {
        Self {
            host: host.into(),
            label,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({})", self.host, label),
            None => write!(f, "{}", self.host),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedMetric {
    pub metric: Metric,
    pub tier: Tier,
}

/// Immutable result of one assessment run.
#[derive(Debug, Serialize)]
pub struct Verdict {
    pub target: Target,
    pub timestamp: DateTime<Utc>,
    pub metrics: Vec<ClassifiedMetric>,
    pub overall: Tier,
    pub voip_ready: bool,
    /// Host interface inventory, for report context only.
    pub local_addrs: Vec<String>,
}

pub fn classify_all(metrics: Vec<Metric>) -> Vec<ClassifiedMetric> {
    metrics
        .into_iter()
        .map(|metric| {
            let tier = classify(&metric);
            ClassifiedMetric { metric, tier }
        })
        .collect()
}

fn tier_of(metrics: &[ClassifiedMetric], kind: MetricKind) -> Tier {
    metrics
        .iter()
        .find(|cm| cm.metric.kind == kind)
        .map(|cm| cm.tier)
        .unwrap_or(Tier::Fail)
}

/// Worst-case aggregation: the overall tier is the max severity over
/// all contributing metrics. The executive "VoIP ready" call is the
/// stricter two-metric rule: neither packet loss nor average latency
/// may be FAIL (a missing metric counts as FAIL).
pub fn aggregate(
    target: Target,
    metrics: Vec<ClassifiedMetric>,
    local_addrs: Vec<String>,
) -> Verdict {
    let overall = metrics
        .iter()
        .map(|cm| cm.tier)
        .max()
        .unwrap_or(Tier::Fail);

    let voip_ready = tier_of(&metrics, MetricKind::PacketLoss) != Tier::Fail
        && tier_of(&metrics, MetricKind::AvgLatency) != Tier::Fail;

    Verdict {
        target,
        timestamp: Utc::now(),
        metrics,
        overall,
        voip_ready,
        local_addrs,
    }
}
