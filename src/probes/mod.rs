//! External-tool probe runner.
//!
//! Every probe invokes the best available tool from an ordered
//! preference list, under a per-invocation timeout. Probe failures are
//! never fatal to a run: the pipeline converts them into FAIL-tier
//! metrics and continues with the remaining probes.

use crate::extract::{Metric, MetricKind};
use crate::verdict::Target;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

pub mod dns;
pub mod interfaces;
pub mod ping;
pub mod public_ip;
pub mod trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Ping,
    Trace,
    Dns,
    PublicIp,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeKind::Ping => write!(f, "ping"),
            ProbeKind::Trace => write!(f, "trace"),
            ProbeKind::Dns => write!(f, "dns"),
            ProbeKind::PublicIp => write!(f, "public-ip"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no suitable tool installed (tried: {tried})")]
    Unavailable { tried: String },

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("no usable signal: {0}")]
    NoResponse(String),
}

/// Raw output of one tool invocation. Consumed once by extraction,
/// then discarded.
#[derive(Debug)]
pub struct ProbeOutput {
    pub tool: String,
    pub stdout: String,
    pub exit_ok: bool,
    pub elapsed: Duration,
}

/// Trait for all active probes.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    fn kind(&self) -> ProbeKind;

    /// Metric kinds this probe contributes. Used to record FAIL-tier
    /// placeholders when the probe itself fails.
    fn metric_kinds(&self) -> &'static [MetricKind];

    async fn collect(&self, target: &Target) -> Result<Vec<Metric>, ProbeError>;
}

/// Run one external tool with a hard wall-clock bound.
///
/// A missing binary maps to `Unavailable` so callers can fall through
/// their preference list. A non-zero exit is not an error here: tools
/// like ping exit non-zero on packet loss while still printing a
/// parseable summary.
pub async fn run_tool(
    tool: &str,
    args: &[&str],
    limit: Duration,
) -> Result<ProbeOutput, ProbeError> {
    let start = Instant::now();

    let mut cmd = tokio::process::Command::new(tool);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(limit, cmd.output()).await {
        Ok(Ok(out)) => out,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProbeError::Unavailable {
                tried: tool.to_string(),
            });
        }
        Ok(Err(e)) => {
            return Err(ProbeError::NoResponse(format!(
                "failed to launch '{}': {}",
                tool, e
            )));
        }
        Err(_) => return Err(ProbeError::Timeout(limit)),
    };

    Ok(ProbeOutput {
        tool: tool.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        exit_ok: output.status.success(),
        elapsed: start.elapsed(),
    })
}

/// Try each (tool, args) candidate in order. A candidate that is
/// absent, times out, or fails to launch yields to the next one; the
/// next candidate is attempted only after the current one's own bound
/// has elapsed.
pub async fn run_first_available(
    candidates: &[(&str, Vec<String>)],
    limit: Duration,
) -> Result<ProbeOutput, ProbeError> {
    let mut tried = Vec::new();
    let mut last_err = None;

    for (tool, args) in candidates {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match run_tool(tool, &args, limit).await {
            Ok(out) => return Ok(out),
            Err(e) => {
                warn!(tool, error = %e, "candidate failed, trying next");
                tried.push(*tool);
                last_err = Some(e);
            }
        }
    }

    // Every candidate missing reads as Unavailable; otherwise report
    // what the last one actually did.
    Err(match last_err {
        Some(e) if !matches!(e, ProbeError::Unavailable { .. }) => e,
        _ => ProbeError::Unavailable {
            tried: tried.join(", "),
        },
    })
}

/// Light target validation before handing a string to an external tool.
pub fn valid_target(target: &str) -> bool {
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == ':' || c == '-')
}
