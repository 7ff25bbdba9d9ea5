//! Public IP reachability via HTTP lookup services.
//!
//! Endpoints are tried in a fixed fallback order; the first one that
//! returns a parseable address wins. Each request carries its own
//! timeout, so a slow service never blocks the run beyond its bound.

use super::{Probe, ProbeError, ProbeKind};
use crate::extract::{Metric, MetricKind};
use crate::verdict::Target;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

const ENDPOINTS: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PublicIpProbe;

#[async_trait::async_trait]
impl Probe for PublicIpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::PublicIp
    }

    fn metric_kinds(&self) -> &'static [MetricKind] {
        &[MetricKind::PublicIp]
    }

    async fn collect(&self, _target: &Target) -> Result<Vec<Metric>, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProbeError::NoResponse(format!("http client: {}", e)))?;

        for endpoint in ENDPOINTS {
            match fetch_ip(&client, endpoint).await {
                Some(ip) => {
                    debug!(%endpoint, %ip, "public ip detected");
                    return Ok(vec![
                        Metric::boolean(MetricKind::PublicIp, true).with_detail(ip.to_string())
                    ]);
                }
                None => warn!(%endpoint, "lookup failed, trying next service"),
            }
        }

        Ok(vec![Metric::boolean(MetricKind::PublicIp, false)
            .with_detail("all lookup services unreachable")])
    }
}

async fn fetch_ip(client: &reqwest::Client, endpoint: &str) -> Option<IpAddr> {
    let body = client
        .get(endpoint)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .text()
        .await
        .ok()?;
    body.trim().parse().ok()
}
