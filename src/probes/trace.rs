//! Route-tracing probe: hop count to the target.
//!
//! Prefers `tracepath` (no elevated privileges needed), falls back to
//! `traceroute`. Requires one of the two to be installed.

use super::{Probe, ProbeError, ProbeKind};
use crate::extract::{self, Metric, MetricKind};
use crate::verdict::Target;
use std::time::Duration;
use tracing::debug;

const TRACE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TraceProbe;

#[async_trait::async_trait]
impl Probe for TraceProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Trace
    }

    fn metric_kinds(&self) -> &'static [MetricKind] {
        &[MetricKind::HopCount]
    }

    async fn collect(&self, target: &Target) -> Result<Vec<Metric>, ProbeError> {
        if !super::valid_target(&target.host) {
            return Err(ProbeError::NoResponse(format!(
                "invalid target '{}'",
                target.host
            )));
        }

        let candidates = [
            ("tracepath", vec!["-n".to_string(), target.host.clone()]),
            (
                "traceroute",
                vec![
                    "-n".to_string(),
                    "-w".to_string(),
                    "2".to_string(),
                    target.host.clone(),
                ],
            ),
        ];

        let output = super::run_first_available(&candidates, TRACE_TIMEOUT).await?;

        let hops = extract::hop_count(&output.stdout);
        debug!(tool = %output.tool, ?hops, "route trace complete");

        let mut metric = Metric::count(MetricKind::HopCount, hops);
        if hops.is_none() {
            metric = metric.with_detail(format!("no hops parsed from {} output", output.tool));
        } else {
            metric = metric.with_detail(format!("via {}", output.tool));
        }
        Ok(vec![metric])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MetricValue;

    #[tokio::test]
    async fn test_rejects_bad_target() {
        let target = Target::new("$(cat /etc/passwd)", None);
        let err = TraceProbe.collect(&target).await.unwrap_err();
        assert!(matches!(err, ProbeError::NoResponse(_)));
    }

    #[test]
    fn test_metric_kind_is_hop_count() {
        assert_eq!(TraceProbe.metric_kinds(), &[MetricKind::HopCount]);
    }

    #[test]
    fn test_unparsed_trace_degrades_to_unknown() {
        // Mirrors the collect() path when the tool ran but printed
        // nothing recognizable.
        let metric = Metric::count(MetricKind::HopCount, extract::hop_count("garbage"));
        assert_eq!(metric.value, MetricValue::Unknown);
    }
}
