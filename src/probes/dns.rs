//! DNS resolution probe.
//!
//! A failed lookup (NXDOMAIN, timeout) is a measurement, not an error:
//! it yields `dns_resolved = false`. Only a broken local resolver
//! configuration surfaces as a probe failure.

use super::{Probe, ProbeError, ProbeKind};
use crate::extract::{Metric, MetricKind};
use crate::verdict::Target;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;

/// Checked instead of the target when the target is a literal IP,
/// since resolving an IP exercises nothing.
const DNS_CHECK_DOMAIN: &str = "google.com";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DnsProbe;

#[async_trait::async_trait]
impl Probe for DnsProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Dns
    }

    fn metric_kinds(&self) -> &'static [MetricKind] {
        &[MetricKind::DnsResolved]
    }

    async fn collect(&self, target: &Target) -> Result<Vec<Metric>, ProbeError> {
        let resolver =
            TokioAsyncResolver::tokio_from_system_conf().map_err(|e| ProbeError::Unavailable {
                tried: format!("system DNS configuration ({})", e),
            })?;

        let name = if target.host.parse::<IpAddr>().is_ok() {
            DNS_CHECK_DOMAIN
        } else {
            target.host.as_str()
        };

        let lookup = tokio::time::timeout(LOOKUP_TIMEOUT, resolver.lookup_ip(name)).await;

        let metric = match lookup {
            Ok(Ok(addrs)) => match addrs.iter().next() {
                Some(ip) => {
                    debug!(%name, %ip, "dns resolution succeeded");
                    Metric::boolean(MetricKind::DnsResolved, true)
                        .with_detail(format!("{} -> {}", name, ip))
                }
                None => Metric::boolean(MetricKind::DnsResolved, false)
                    .with_detail(format!("{}: empty answer", name)),
            },
            Ok(Err(e)) => Metric::boolean(MetricKind::DnsResolved, false)
                .with_detail(format!("{}: {}", name, e)),
            Err(_) => Metric::boolean(MetricKind::DnsResolved, false)
                .with_detail(format!("{}: lookup timed out", name)),
        };

        Ok(vec![metric])
    }
}
