//! End-to-end classification scenarios through the public library API:
//! raw tool output -> extraction -> classification -> aggregation.

use voipready::classify::Tier;
use voipready::extract::{self, Metric, MetricKind, MetricValue};
use voipready::verdict::{aggregate, classify_all, Target};

fn fixture_clean_ping() -> &'static str {
    "\
PING 198.51.100.7 (198.51.100.7) 56(84) bytes of data.

--- 198.51.100.7 ping statistics ---
20 packets transmitted, 20 received, 0% packet loss, time 3816ms
rtt min/avg/max/mdev = 31.210/35.002/41.890/4.020 ms
"
}

fn fixture_degraded_ping() -> &'static str {
    "\
--- 198.51.100.7 ping statistics ---
200 packets transmitted, 190 received, 5% packet loss, time 40339ms
rtt min/avg/max/mdev = 150.312/200.441/390.620/45.118 ms
"
}

fn metrics_from_ping(output: &str) -> Vec<Metric> {
    let loss = extract::loss_percent(output);
    let rtt = extract::rtt_summary(output);
    vec![
        Metric::float(MetricKind::PacketLoss, loss),
        Metric::float(MetricKind::AvgLatency, rtt.map(|r| r.avg)),
        Metric::float(MetricKind::MaxLatency, rtt.map(|r| r.max)),
        Metric::float(MetricKind::Jitter, rtt.map(|r| r.mdev)),
    ]
}

#[test]
fn test_scenario_clean_path_is_ready() {
    let verdict = aggregate(
        Target::new("198.51.100.7", Some("SIP provider".to_string())),
        classify_all(metrics_from_ping(fixture_clean_ping())),
        Vec::new(),
    );

    assert_eq!(verdict.overall, Tier::Pass);
    assert!(verdict.voip_ready);
    assert!(verdict.metrics.iter().all(|cm| cm.tier == Tier::Pass));
}

#[test]
fn test_scenario_degraded_path_is_not_ready() {
    let verdict = aggregate(
        Target::new("198.51.100.7", None),
        classify_all(metrics_from_ping(fixture_degraded_ping())),
        Vec::new(),
    );

    assert_eq!(verdict.overall, Tier::Fail);
    assert!(!verdict.voip_ready);
}

#[test]
fn test_scenario_dns_failure_keeps_report_complete() {
    // DNS lookup returned no answer; every other metric still present
    let mut metrics = metrics_from_ping(fixture_clean_ping());
    metrics.push(
        Metric::boolean(MetricKind::DnsResolved, false).with_detail("sip.example.com: NXDOMAIN"),
    );
    metrics.push(Metric::count(MetricKind::HopCount, Some(8)));

    let verdict = aggregate(
        Target::new("sip.example.com", None),
        classify_all(metrics),
        Vec::new(),
    );

    assert_eq!(verdict.metrics.len(), 6);
    let dns = verdict
        .metrics
        .iter()
        .find(|cm| cm.metric.kind == MetricKind::DnsResolved)
        .expect("dns metric present");
    assert_eq!(dns.tier, Tier::Fail);
    assert_eq!(verdict.overall, Tier::Fail);
    // loss and avg latency are both fine, so the executive call holds
    assert!(verdict.voip_ready);
}

#[test]
fn test_scenario_unparseable_output_degrades_to_fail() {
    let metrics = metrics_from_ping("ping: connect: Network is unreachable\n");
    assert!(metrics.iter().all(|m| m.value == MetricValue::Unknown));

    let verdict = aggregate(
        Target::new("198.51.100.7", None),
        classify_all(metrics),
        Vec::new(),
    );
    assert!(verdict.metrics.iter().all(|cm| cm.tier == Tier::Fail));
    assert!(!verdict.voip_ready);
}

#[test]
fn test_scenario_warn_band_still_ready() {
    let verdict = aggregate(
        Target::new("198.51.100.7", None),
        classify_all(vec![
            Metric::float(MetricKind::PacketLoss, Some(1.5)),
            Metric::float(MetricKind::AvgLatency, Some(80.0)),
        ]),
        Vec::new(),
    );
    assert_eq!(verdict.overall, Tier::Warn);
    assert!(verdict.voip_ready);
}
