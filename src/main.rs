//! Command-line interface for telemetry-replay
//!
//! # Usage Examples
//!
//! ```bash
//! # Replay one million events into a local QuestDB with ten senders
//! telemetry-replay \
//!   --csv ./cisco_baseline_500gbps.csv \
//!   --addrs localhost:9000 \
//!   --total-events 1000000 \
//!   --num-senders 10
//!
//! # Use the dataset's own timestamps and an authenticated endpoint
//! telemetry-replay \
//!   --csv ./telemetry.csv.gz \
//!   --addrs db-a:9000,db-b:9000 \
//!   --token $INGEST_TOKEN \
//!   --timestamp-from-file
//! ```
//!
//! # Exit Codes
//!
//! - `0` - every worker completed its full assignment
//! - `1` - one or more workers failed during replay
//! - `2` - configuration or validation failure before any worker started

use clap::Parser;
use replay_core::{run_job, JobConfig, JobSummary, ReplayError, WorkerStatus};
use replay_dataset::{Dataset, RoleConfig};
use std::process::ExitCode;
use std::sync::Arc;
use telemetry_replay::{EndpointOpts, ReplayOpts};
use tracing::{error, info};

/// Exit code for configuration failures detected before dispatch.
const EXIT_CONFIG: u8 = 2;

/// Exit code when one or more workers failed during replay.
const EXIT_REPLAY_FAILED: u8 = 1;

#[derive(Parser)]
#[command(name = "telemetry-replay")]
#[command(about = "Replays a recorded telemetry dataset into a time-series ingestion endpoint")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    replay: ReplayOpts,

    #[command(flatten)]
    endpoint: EndpointOpts,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            if let Some(report) = summary.first_failure() {
                if let WorkerStatus::Failed(cause) = &report.status {
                    error!("Replay failed, first failing worker {}: {cause}", report.worker_id);
                }
            }
            ExitCode::from(EXIT_REPLAY_FAILED)
        }
        Err(ReplayError::Config(message)) => {
            error!("{message}");
            ExitCode::from(EXIT_CONFIG)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(EXIT_REPLAY_FAILED)
        }
    }
}

async fn run(cli: Cli) -> Result<JobSummary, ReplayError> {
    if !cli.replay.csv_path.exists() {
        return Err(ReplayError::Config(format!(
            "CSV file not found: {}",
            cli.replay.csv_path.display()
        )));
    }

    let roles = match &cli.replay.columns {
        Some(path) => RoleConfig::from_file(path).map_err(|e| {
            ReplayError::Config(format!(
                "failed to load column configuration from {}: {e}",
                path.display()
            ))
        })?,
        None => RoleConfig::default(),
    };

    let sender = cli
        .endpoint
        .to_sender_config()
        .map_err(|e| ReplayError::Config(e.to_string()))?;
    info!("Ingestion started. Connecting with config: {}", sender.describe());

    let dataset = Dataset::from_path(&cli.replay.csv_path)
        .map_err(|e| ReplayError::Config(format!("failed to load dataset: {e}")))?;

    let config = JobConfig {
        table: cli.replay.table.clone(),
        total_events: cli.replay.total_events,
        num_workers: cli.replay.num_senders,
        delay: cli.replay.delay(),
        timestamp_policy: cli.replay.timestamp_policy(),
        flush_rows: cli.replay.flush_rows,
        sender,
    };

    run_job(&config, Arc::new(dataset), &roles).await
}
