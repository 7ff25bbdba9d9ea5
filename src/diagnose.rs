//! One-shot readiness assessment pipeline.
//!
//! Probes run sequentially; any probe-level failure degrades to
//! FAIL-tier metrics with an explicit reason. The run aborts only on
//! internal faults (e.g. the report file cannot be written).

use crate::extract::Metric;
use crate::probes::{self, Probe};
use crate::report::{self, ReportSink};
use crate::verdict::{aggregate, classify_all, Target, Verdict};
use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

pub struct DiagnoseOptions {
    pub target: Target,
    pub ping_count: u32,
    pub json: bool,
}

/// Run the full probe battery and render/persist the verdict.
pub async fn run(opts: DiagnoseOptions) -> Result<Verdict> {
    let probes: Vec<Box<dyn Probe>> = vec![
        Box::new(probes::ping::PingProbe {
            count: opts.ping_count,
            ..Default::default()
        }),
        Box::new(probes::trace::TraceProbe),
        Box::new(probes::dns::DnsProbe),
        Box::new(probes::public_ip::PublicIpProbe),
    ];

    let mut metrics = Vec::new();
    for probe in &probes {
        info!(probe = %probe.kind(), target = %opts.target.host, "running probe");
        match probe.collect(&opts.target).await {
            Ok(found) => metrics.extend(found),
            Err(e) => {
                warn!(probe = %probe.kind(), error = %e, "probe failed, degrading to FAIL");
                for kind in probe.metric_kinds() {
                    metrics.push(Metric::unknown(*kind).with_detail(e.to_string()));
                }
            }
        }
    }

    let local_addrs = match probes::interfaces::local_addresses().await {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!(error = %e, "interface inventory unavailable");
            Vec::new()
        }
    };

    let verdict = aggregate(opts.target, classify_all(metrics), local_addrs);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        let path = std::path::PathBuf::from(report::artifact_name(Utc::now()));
        let mut sink = ReportSink::with_file(&path)?;
        report::render(&verdict, &mut sink)?;
        if let Some(written) = sink.finish()? {
            info!(path = %written.display(), "report written");
        }
    }

    Ok(verdict)
}
