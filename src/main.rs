use anyhow::Result;
use clap::{Parser, Subcommand};
use voipready::diagnose::{self, DiagnoseOptions};
use voipready::monitor::{self, MonitorOptions};
use voipready::verdict::Target;

#[derive(Parser)]
#[command(
    name = "voipready",
    about = "VoIP network readiness assessment for call-center deployments",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full one-shot probe battery and write a timestamped report
    Diagnose {
        /// Target host or IP
        #[arg(default_value = "8.8.8.8")]
        target: String,

        /// Human label for the target, e.g. "SIP provider"
        #[arg(long)]
        label: Option<String>,

        /// Number of echo requests in the ping battery
        #[arg(long, default_value = "20")]
        count: u32,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Stream classified latency samples against a target
    Monitor {
        /// Target host or IP
        target: String,

        /// Session length in minutes
        #[arg(default_value = "1")]
        duration_minutes: u64,

        /// Human label for the target
        #[arg(long)]
        label: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing. Logs go to stderr: stdout is reserved for the
    // report stream, which must stay byte-identical to the artifact.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diagnose {
            target,
            label,
            count,
            json,
        } => {
            tracing::info!(%target, "Running readiness diagnosis");
            // Metric tiers never fail the process; only internal faults do.
            diagnose::run(DiagnoseOptions {
                target: Target::new(target, label),
                ping_count: count,
                json,
            })
            .await?;
        }
        Commands::Monitor {
            target,
            duration_minutes,
            label,
        } => {
            tracing::info!(%target, duration_minutes, "Starting live monitor");
            monitor::run(MonitorOptions {
                target: Target::new(target, label),
                duration_minutes,
            })
            .await?;
        }
    }

    Ok(())
}
