//! Live latency stream monitor.
//!
//! Consumes the streaming ping line-by-line, classifying and printing
//! each sample as it arrives, then feeds the accumulated sample set
//! through the same classifier/aggregator/renderer as the one-shot
//! path. Ctrl-C terminates the child ping, keeps the samples gathered
//! so far, and still produces a valid (partial) summary with exit
//! code 0.

use crate::classify::{classify_sample_rtt, Tier};
use crate::extract::{self, Metric, MetricKind};
use crate::probes::ping::PingStream;
use crate::report::{self, ReportSink};
use crate::verdict::{aggregate, classify_all, Target, Verdict};
use anyhow::{Context, Result};
use tracing::info;

const SAMPLE_INTERVAL_SECS: f64 = 1.0;

pub struct MonitorOptions {
    pub target: Target,
    pub duration_minutes: u64,
}

/// One latency reading with its own tier. `rtt_ms = None` is a lost
/// sample.
#[derive(Debug, Clone)]
pub struct Sample {
    pub seq: u32,
    pub rtt_ms: Option<f64>,
    pub tier: Tier,
}

impl Sample {
    /// Parse one line of streaming ping output. Header and summary
    /// lines yield `None`.
    fn from_line(line: &str, seq: u32) -> Option<Self> {
        if let Some(rtt) = extract::sample_rtt(line) {
            return Some(Self {
                seq,
                rtt_ms: Some(rtt),
                tier: classify_sample_rtt(rtt),
            });
        }
        if extract::is_lost_sample(line) {
            return Some(Self {
                seq,
                rtt_ms: None,
                tier: Tier::Fail,
            });
        }
        None
    }

    fn display(&self) -> String {
        match self.rtt_ms {
            Some(rtt) => format!("sample {:>4}: {} ms [{}]", self.seq, rtt, report::tier_token(self.tier)),
            None => format!("sample {:>4}: lost [{}]", self.seq, report::tier_token(self.tier)),
        }
    }
}

/// Aggregate statistics over a finished (or interrupted) session.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamStats {
    pub transmitted: u32,
    pub received: u32,
    pub loss_pct: Option<f64>,
    pub min_ms: Option<f64>,
    pub avg_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub jitter_ms: Option<f64>,
}

impl StreamStats {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let transmitted = samples.len() as u32;
        let rtts: Vec<f64> = samples.iter().filter_map(|s| s.rtt_ms).collect();
        let received = rtts.len() as u32;

        let loss_pct = if transmitted > 0 {
            Some((transmitted - received) as f64 / transmitted as f64 * 100.0)
        } else {
            None
        };

        if rtts.is_empty() {
            return Self {
                transmitted,
                received,
                loss_pct,
                min_ms: None,
                avg_ms: None,
                max_ms: None,
                jitter_ms: None,
            };
        }

        let sum: f64 = rtts.iter().sum();
        let avg = sum / rtts.len() as f64;
        let min = rtts.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = rtts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // mean absolute deviation, matching ping's mdev approximation
        let jitter = rtts.iter().map(|r| (r - avg).abs()).sum::<f64>() / rtts.len() as f64;

        Self {
            transmitted,
            received,
            loss_pct,
            min_ms: Some(min),
            avg_ms: Some(avg),
            max_ms: Some(max),
            jitter_ms: Some(jitter),
        }
    }

    /// Convert to the metric set fed through the one-shot pipeline.
    pub fn to_metrics(&self) -> Vec<Metric> {
        vec![
            Metric::float(MetricKind::PacketLoss, self.loss_pct)
                .with_detail(format!("{}/{} replies", self.received, self.transmitted)),
            Metric::float(MetricKind::AvgLatency, self.avg_ms),
            Metric::float(MetricKind::MaxLatency, self.max_ms),
            Metric::float(MetricKind::Jitter, self.jitter_ms),
        ]
    }
}

/// Run the live stream session to completion or interruption.
pub async fn run(opts: MonitorOptions) -> Result<Verdict> {
    let planned = (opts.duration_minutes.max(1) * 60) as u32;
    info!(
        target = %opts.target.host,
        planned_samples = planned,
        "starting live latency stream"
    );

    let mut stream = PingStream::spawn(&opts.target.host, planned, SAMPLE_INTERVAL_SECS)
        .context("cannot start latency stream")?;

    println!(
        "Streaming {} samples against {} (interval {:.0}s); Ctrl-C to stop early",
        planned, opts.target, SAMPLE_INTERVAL_SECS
    );

    let mut samples: Vec<Sample> = Vec::new();
    let mut interrupted = false;

    // Registered once so a signal landing between iterations is not
    // lost to a dropped listener.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = stream.next_line() => {
                match line.context("reading ping output")? {
                    Some(text) => {
                        if let Some(sample) = Sample::from_line(&text, samples.len() as u32 + 1) {
                            println!("{}", sample.display());
                            samples.push(sample);
                        }
                    }
                    None => break,
                }
            }
            _ = &mut ctrl_c => {
                interrupted = true;
                break;
            }
        }
    }

    if interrupted {
        stream.shutdown().await;
        println!();
        println!(
            "Interrupted; summarizing the {} sample(s) collected so far",
            samples.len()
        );
    }

    let stats = StreamStats::from_samples(&samples);
    let verdict = aggregate(opts.target, classify_all(stats.to_metrics()), Vec::new());

    println!();
    let mut sink = ReportSink::stdout_only();
    report::render(&verdict, &mut sink)?;
    sink.finish()?;

    Ok(verdict)
}
