//! ICMP echo probing via the system ping tool.
//!
//! Two modes: a bounded one-shot battery whose summary yields the
//! loss/latency/jitter metrics, and a streaming mode that hands each
//! reply line to the caller as it arrives.

use super::{Probe, ProbeError, ProbeKind, ProbeOutput};
use crate::extract::{self, Metric, MetricKind};
use crate::verdict::Target;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout};
use tracing::{debug, warn};

/// One-shot ping battery. Count and interval are configurable; the
/// invocation timeout is derived from them plus slack.
pub struct PingProbe {
    pub count: u32,
    pub interval_secs: f64,
}

impl Default for PingProbe {
    fn default() -> Self {
        Self {
            count: 20,
            interval_secs: 0.2,
        }
    }
}

impl PingProbe {
    fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.count as f64 * self.interval_secs + 10.0)
    }
}

#[async_trait::async_trait]
impl Probe for PingProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Ping
    }

    fn metric_kinds(&self) -> &'static [MetricKind] {
        &[
            MetricKind::PacketLoss,
            MetricKind::AvgLatency,
            MetricKind::MaxLatency,
            MetricKind::Jitter,
        ]
    }

    async fn collect(&self, target: &Target) -> Result<Vec<Metric>, ProbeError> {
        if !super::valid_target(&target.host) {
            return Err(ProbeError::NoResponse(format!(
                "invalid target '{}'",
                target.host
            )));
        }

        let count = self.count.to_string();
        let interval = format!("{:.1}", self.interval_secs);
        let output = super::run_tool(
            "ping",
            &["-n", "-q", "-c", &count, "-i", &interval, &target.host],
            self.timeout(),
        )
        .await?;

        debug!(
            tool = %output.tool,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "ping battery complete"
        );

        Ok(extract_battery_metrics(&output))
    }
}

/// Turn a ping summary into the four latency-related metrics. Missing
/// patterns degrade to Unknown values, never errors.
fn extract_battery_metrics(output: &ProbeOutput) -> Vec<Metric> {
    let loss = extract::loss_percent(&output.stdout);
    if loss.is_none() {
        warn!(tool = %output.tool, "no packet-loss summary in ping output");
    }

    let rtt = extract::rtt_summary(&output.stdout);
    let rtt_detail = match (loss, &rtt) {
        (Some(l), None) if l >= 100.0 => Some("no echo replies"),
        (_, None) => Some("no rtt summary in ping output"),
        _ => None,
    };

    let mut metrics = vec![Metric::float(MetricKind::PacketLoss, loss)];
    for (kind, value) in [
        (MetricKind::AvgLatency, rtt.map(|r| r.avg)),
        (MetricKind::MaxLatency, rtt.map(|r| r.max)),
        (MetricKind::Jitter, rtt.map(|r| r.mdev)),
    ] {
        let mut m = Metric::float(kind, value);
        if let Some(d) = rtt_detail {
            m = m.with_detail(d);
        }
        metrics.push(m);
    }
    metrics
}

/// A long-running ping whose output lines are consumed incrementally
/// while the child is still running. The child is killed on drop, so an
/// interrupted session leaves no dangling process.
#[derive(Debug)]
pub struct PingStream {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl PingStream {
    /// Spawn `ping` for `count` samples at `interval_secs` spacing.
    /// Uses `-O` so every unanswered echo produces its own marker line.
    pub fn spawn(target: &str, count: u32, interval_secs: f64) -> Result<Self, ProbeError> {
        if !super::valid_target(target) {
            return Err(ProbeError::NoResponse(format!("invalid target '{}'", target)));
        }

        let mut child = tokio::process::Command::new("ping")
            .arg("-O")
            .arg("-n")
            .arg("-c")
            .arg(count.to_string())
            .arg("-i")
            .arg(format!("{:.1}", interval_secs))
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::Unavailable {
                        tried: "ping".to_string(),
                    }
                } else {
                    ProbeError::NoResponse(format!("failed to launch ping: {}", e))
                }
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ProbeError::NoResponse("ping stdout not captured".to_string())
        })?;

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
        })
    }

    /// Next completed output line, or `None` once the child has exited
    /// and the pipe is drained.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }

    /// Terminate the child immediately. Used on cancellation.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill ping child");
        }
        let _ = self.child.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MetricValue;

    fn fake_output(stdout: &str) -> ProbeOutput {
        ProbeOutput {
            tool: "ping".to_string(),
            stdout: stdout.to_string(),
            exit_ok: true,
            elapsed: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_battery_metrics_clean_run() {
        let out = fake_output(
            "20 packets transmitted, 20 received, 0% packet loss, time 3816ms\n\
             rtt min/avg/max/mdev = 11.489/12.829/14.147/0.735 ms\n",
        );
        let metrics = extract_battery_metrics(&out);
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics[0].value, MetricValue::Float(0.0));
        assert_eq!(metrics[1].value, MetricValue::Float(12.829));
        assert_eq!(metrics[2].value, MetricValue::Float(14.147));
        assert_eq!(metrics[3].value, MetricValue::Float(0.735));
    }

    #[test]
    fn test_battery_metrics_total_loss() {
        let out =
            fake_output("5 packets transmitted, 0 received, 100% packet loss, time 4077ms\n");
        let metrics = extract_battery_metrics(&out);
        assert_eq!(metrics[0].value, MetricValue::Float(100.0));
        // no rtt line when everything is lost: latency metrics degrade
        assert_eq!(metrics[1].value, MetricValue::Unknown);
        assert_eq!(metrics[1].detail.as_deref(), Some("no echo replies"));
    }

    #[test]
    fn test_battery_metrics_garbage_output() {
        let metrics = extract_battery_metrics(&fake_output("ping: nosuchhost: not known\n"));
        assert_eq!(metrics.len(), 4);
        assert!(metrics.iter().all(|m| m.value == MetricValue::Unknown));
    }

    #[tokio::test]
    async fn test_stream_rejects_bad_target() {
        let err = PingStream::spawn("a; reboot", 5, 1.0).unwrap_err();
        assert!(matches!(err, ProbeError::NoResponse(_)));
    }
}
