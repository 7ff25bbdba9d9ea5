//! Report rendering and persistence.
//!
//! All output goes through a [`ReportSink`] that writes each line to
//! stdout and, for one-shot runs, to the timestamped report artifact —
//! the two are always byte-identical.

use crate::classify::Tier;
use crate::verdict::Verdict;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Stateless presentation token for a tier.
pub fn tier_token(tier: Tier) -> &'static str {
    match tier {
        Tier::Pass => "PASS",
        Tier::Warn => "WARN",
        Tier::Fail => "FAIL",
    }
}

/// Artifact name for a run; the UTC timestamp keeps names sortable and
/// collision-free across runs.
pub fn artifact_name(now: DateTime<Utc>) -> String {
    format!("voip-readiness-{}.txt", now.format("%Y%m%d-%H%M%S"))
}

/// Line sink writing to stdout and optionally mirroring to a file.
pub struct ReportSink {
    file: Option<(PathBuf, File)>,
}

impl ReportSink {
    pub fn stdout_only() -> Self {
        Self { file: None }
    }

    pub fn with_file(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        Ok(Self {
            file: Some((path.to_path_buf(), file)),
        })
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        println!("{}", text);
        if let Some((path, file)) = &mut self.file {
            writeln!(file, "{}", text)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }

    /// Flush the artifact. Called on every exit path that rendered one.
    pub fn finish(mut self) -> Result<Option<PathBuf>> {
        match self.file.take() {
            Some((path, mut file)) => {
                file.flush()
                    .with_context(|| format!("failed to flush {}", path.display()))?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}

/// Render the verdict: header, per-metric table, executive summary.
pub fn render(verdict: &Verdict, sink: &mut ReportSink) -> Result<()> {
    sink.line("=== VoIP Network Readiness Report ===")?;
    sink.line(&format!("Target: {}", verdict.target))?;
    sink.line(&format!(
        "Time:   {} UTC",
        verdict.timestamp.format("%Y-%m-%d %H:%M:%S")
    ))?;
    if !verdict.local_addrs.is_empty() {
        sink.line(&format!("Local:  {}", verdict.local_addrs.join(", ")))?;
    }
    sink.line("")?;

    sink.line(&format!(
        "{:<16} | {:<14} | {:<4} | Details",
        "Metric", "Value", "Tier"
    ))?;
    sink.line(&format!("{:-<16}-|-{:-<14}-|-{:-<4}-|-{:-<30}", "", "", "", ""))?;

    for cm in &verdict.metrics {
        sink.line(&format!(
            "{:<16} | {:<14} | {:<4} | {}",
            cm.metric.kind.label(),
            cm.metric.display_value(),
            tier_token(cm.tier),
            cm.metric.detail.as_deref().unwrap_or(""),
        ))?;
    }

    sink.line("")?;
    sink.line(&format!("Overall:    {}", tier_token(verdict.overall)))?;
    sink.line(&format!(
        "VoIP ready: {}",
        if verdict.voip_ready { "YES" } else { "NO" }
    ))?;

    Ok(())
}
