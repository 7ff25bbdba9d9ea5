//! Metric model and text-pattern extraction from probe tool output.
//!
//! Tool output formats vary across platforms (iputils vs BSD ping,
//! tracepath vs traceroute). Extraction never errors: a pattern that
//! cannot be found yields `MetricValue::Unknown`, which the classifier
//! treats as the worst tier.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    PacketLoss,
    AvgLatency,
    MaxLatency,
    Jitter,
    HopCount,
    DnsResolved,
    PublicIp,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::PacketLoss => "Packet loss",
            MetricKind::AvgLatency => "Avg latency",
            MetricKind::MaxLatency => "Max latency",
            MetricKind::Jitter => "Jitter",
            MetricKind::HopCount => "Hop count",
            MetricKind::DnsResolved => "DNS resolution",
            MetricKind::PublicIp => "Public IP",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::PacketLoss => "%",
            MetricKind::AvgLatency | MetricKind::MaxLatency | MetricKind::Jitter => "ms",
            MetricKind::HopCount | MetricKind::DnsResolved | MetricKind::PublicIp => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Float(f64),
    Count(u32),
    Bool(bool),
    Unknown,
}

/// A single typed measurement derived from probe output.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub kind: MetricKind,
    pub value: MetricValue,
    /// Extra context for the report (resolved address, failure reason).
    pub detail: Option<String>,
}

impl Metric {
    pub fn float(kind: MetricKind, value: Option<f64>) -> Self {
        Self {
            kind,
            value: value.map(MetricValue::Float).unwrap_or(MetricValue::Unknown),
            detail: None,
        }
    }

    pub fn count(kind: MetricKind, value: Option<u32>) -> Self {
        Self {
            kind,
            value: value.map(MetricValue::Count).unwrap_or(MetricValue::Unknown),
            detail: None,
        }
    }

    pub fn boolean(kind: MetricKind, value: bool) -> Self {
        Self {
            kind,
            value: MetricValue::Bool(value),
            detail: None,
        }
    }

    pub fn unknown(kind: MetricKind) -> Self {
        Self {
            kind,
            value: MetricValue::Unknown,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Value as rendered in the report. Unknown is always shown
    /// explicitly, never omitted.
    pub fn display_value(&self) -> String {
        match &self.value {
            MetricValue::Float(v) => {
                let unit = self.kind.unit();
                if unit == "%" {
                    format!("{}%", v)
                } else {
                    format!("{} {}", v, unit)
                }
            }
            MetricValue::Count(n) => n.to_string(),
            MetricValue::Bool(true) => "yes".to_string(),
            MetricValue::Bool(false) => "no".to_string(),
            MetricValue::Unknown => "unavailable".to_string(),
        }
    }
}

/// min/avg/max/mdev statistics from a ping summary line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RttSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub mdev: f64,
}

/// Extract "N% packet loss" from ping summary output.
pub fn loss_percent(output: &str) -> Option<f64> {
    let anchor = output.find("% packet loss")?;
    let head = &output[..anchor];
    let start = head
        .rfind(|c: char| !c.is_ascii_digit() && c != '.')
        .map(|i| i + 1)
        .unwrap_or(0);
    head[start..].parse().ok()
}

/// Extract the "rtt min/avg/max/mdev = a/b/c/d ms" summary line.
/// Also accepts the BSD "round-trip min/avg/max/stddev" spelling.
pub fn rtt_summary(output: &str) -> Option<RttSummary> {
    for line in output.lines() {
        if !line.contains("min/avg/max") {
            continue;
        }
        let (_, values) = line.split_once(" = ")?;
        let values = values.trim().trim_end_matches("ms").trim();
        let mut parts = values.split('/');
        let min = parts.next()?.trim().parse().ok()?;
        let avg = parts.next()?.trim().parse().ok()?;
        let max = parts.next()?.trim().parse().ok()?;
        let mdev = parts.next()?.trim().parse().ok()?;
        return Some(RttSummary { min, avg, max, mdev });
    }
    None
}

/// Extract "time=X" from a single ping reply line.
pub fn sample_rtt(line: &str) -> Option<f64> {
    let pos = line.find("time=")?;
    let rest = &line[pos + 5..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// True for the iputils `-O` marker line printed per unanswered echo.
pub fn is_lost_sample(line: &str) -> bool {
    line.contains("no answer yet")
}

/// Count hops in tracepath/traceroute output. Both number their hop
/// lines; tracepath repeats a hop number per reply, so the maximum seen
/// is the path length.
pub fn hop_count(output: &str) -> Option<u32> {
    let mut max_hop = None;
    for line in output.lines() {
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        let first = first.trim_end_matches(':');
        if let Ok(n) = first.parse::<u32>() {
            max_hop = Some(max_hop.map_or(n, |m: u32| m.max(n)));
        }
    }
    max_hop
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_SUMMARY: &str = "\
--- 8.8.8.8 ping statistics ---
20 packets transmitted, 20 received, 0% packet loss, time 3816ms
rtt min/avg/max/mdev = 11.489/12.829/14.147/0.735 ms";

    const MACOS_SUMMARY: &str = "\
--- 8.8.8.8 ping statistics ---
20 packets transmitted, 19 packets received, 5.0% packet loss
round-trip min/avg/max/stddev = 11.489/12.829/14.147/0.735 ms";

    #[test]
    fn test_loss_percent_linux() {
        assert_eq!(loss_percent(LINUX_SUMMARY), Some(0.0));
    }

    #[test]
    fn test_loss_percent_fractional() {
        assert_eq!(loss_percent(MACOS_SUMMARY), Some(5.0));
        assert_eq!(
            loss_percent("100 packets transmitted, 98 received, 1.5% packet loss"),
            Some(1.5)
        );
    }

    #[test]
    fn test_loss_percent_missing() {
        assert_eq!(loss_percent("ping: unknown host nosuchhost"), None);
        assert_eq!(loss_percent(""), None);
    }

    #[test]
    fn test_rtt_summary_linux() {
        let s = rtt_summary(LINUX_SUMMARY).expect("should parse");
        assert_eq!(s.min, 11.489);
        assert_eq!(s.avg, 12.829);
        assert_eq!(s.max, 14.147);
        assert_eq!(s.mdev, 0.735);
    }

    #[test]
    fn test_rtt_summary_macos() {
        let s = rtt_summary(MACOS_SUMMARY).expect("should parse");
        assert_eq!(s.avg, 12.829);
    }

    #[test]
    fn test_rtt_summary_missing() {
        // 100% loss: ping omits the rtt line entirely
        let out = "5 packets transmitted, 0 received, 100% packet loss, time 4077ms";
        assert_eq!(rtt_summary(out), None);
    }

    #[test]
    fn test_sample_rtt() {
        let line = "64 bytes from 8.8.8.8: icmp_seq=3 ttl=117 time=12.4 ms";
        assert_eq!(sample_rtt(line), Some(12.4));
        assert_eq!(sample_rtt("--- ping statistics ---"), None);
    }

    #[test]
    fn test_lost_sample_marker() {
        assert!(is_lost_sample("no answer yet for icmp_seq=5"));
        assert!(!is_lost_sample("64 bytes from 8.8.8.8: icmp_seq=5 time=9.1 ms"));
    }

    #[test]
    fn test_hop_count_tracepath() {
        let out = "\
 1?: [LOCALHOST]                      pmtu 1500
 1:  192.168.1.1                          0.521ms
 1:  192.168.1.1                          0.413ms
 2:  10.64.0.1                            8.102ms
 3:  142.251.54.103                      12.333ms reached";
        assert_eq!(hop_count(out), Some(3));
    }

    #[test]
    fn test_hop_count_traceroute() {
        let out = "\
traceroute to 8.8.8.8 (8.8.8.8), 30 hops max, 60 byte packets
 1  192.168.1.1  0.412 ms  0.380 ms  0.371 ms
 2  10.64.0.1  8.114 ms  8.090 ms  8.331 ms
 3  * * *
 4  8.8.8.8  12.400 ms  12.221 ms  12.109 ms";
        assert_eq!(hop_count(out), Some(4));
    }

    #[test]
    fn test_hop_count_garbage() {
        assert_eq!(hop_count("command not found"), None);
    }

    #[test]
    fn test_metric_unknown_display() {
        let m = Metric::float(MetricKind::AvgLatency, None);
        assert_eq!(m.value, MetricValue::Unknown);
        assert_eq!(m.display_value(), "unavailable");
    }

    #[test]
    fn test_metric_display_units() {
        assert_eq!(
            Metric::float(MetricKind::PacketLoss, Some(1.5)).display_value(),
            "1.5%"
        );
        assert_eq!(
            Metric::float(MetricKind::AvgLatency, Some(23.4)).display_value(),
            "23.4 ms"
        );
        assert_eq!(
            Metric::count(MetricKind::HopCount, Some(11)).display_value(),
            "11"
        );
        assert_eq!(
            Metric::boolean(MetricKind::DnsResolved, false).display_value(),
            "no"
        );
    }
}
