//! telemetry-replay library surface.
//!
//! Replays a fixed dataset of recorded telemetry rows into a time-series
//! ingestion endpoint at a configurable rate and concurrency, for
//! benchmarking and stress-testing ingestion pipelines.
//!
//! The heavy lifting lives in the member crates:
//!
//! - `replay-dataset` - dataset loading and column-role classification
//! - `replay-core` - work distribution, record encoding, the worker pool
//! - `ilp-client` - the ILP-over-HTTP transport
//!
//! This crate holds the CLI option groups and their conversion into the
//! engine's configuration types.

use clap::Args;
use ilp_client::{Auth, IlpError, SenderConfig};
use replay_core::TimestampPolicy;
use std::path::PathBuf;
use std::time::Duration;

pub use ilp_client;
pub use replay_core;
pub use replay_dataset;

/// Ingestion endpoint connection options.
///
/// Everything here is handed through to the transport unmodified.
#[derive(Args, Clone, Debug)]
pub struct EndpointOpts {
    /// Comma-separated ingestion addresses (host:port), tried in order
    #[arg(long, default_value = "questdb:9000", env = "REPLAY_ADDRS")]
    pub addrs: String,

    /// Bearer token for HTTP auth (implies TLS)
    #[arg(long, env = "REPLAY_TOKEN")]
    pub token: Option<String>,

    /// Username for HTTP basic auth (implies TLS, requires --password)
    #[arg(long, env = "REPLAY_USERNAME")]
    pub username: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long, env = "REPLAY_PASSWORD")]
    pub password: Option<String>,

    /// Total time in milliseconds to keep retrying failed writes
    #[arg(long, default_value = "360000")]
    pub retry_timeout_ms: u64,
}

impl EndpointOpts {
    /// Build the transport configuration.
    ///
    /// Token auth wins over basic credentials when both are supplied;
    /// basic auth requires both a username and a password, otherwise the
    /// credentials are ignored.
    pub fn to_sender_config(&self) -> Result<SenderConfig, IlpError> {
        let auth = match (&self.token, &self.username, &self.password) {
            (Some(token), _, _) if !token.is_empty() => Auth::Token(token.clone()),
            (_, Some(username), Some(password))
                if !username.is_empty() && !password.is_empty() =>
            {
                Auth::Basic {
                    username: username.clone(),
                    password: password.clone(),
                }
            }
            _ => Auth::None,
        };

        Ok(SenderConfig::from_addr_list(&self.addrs)?
            .with_auth(auth)
            .with_retry_timeout(Duration::from_millis(self.retry_timeout_ms)))
    }
}

/// Replay workload options.
#[derive(Args, Clone, Debug)]
pub struct ReplayOpts {
    /// Path to the telemetry CSV dataset (.gz accepted)
    #[arg(long = "csv", default_value = "./cisco_baseline_500gbps.csv")]
    pub csv_path: PathBuf,

    /// Target table name
    #[arg(long, default_value = "cisco_baseline")]
    pub table: String,

    /// Total number of events to replay across all senders
    #[arg(long, default_value = "1000000")]
    pub total_events: u64,

    /// Number of parallel sender workers
    #[arg(long, default_value = "10")]
    pub num_senders: usize,

    /// Fixed per-event delay in milliseconds per worker (0 disables pacing)
    #[arg(long, default_value = "50")]
    pub delay_ms: u64,

    /// Take record timestamps from the dataset's timestamp column
    #[arg(long)]
    pub timestamp_from_file: bool,

    /// Optional YAML file overriding the column classification sets
    #[arg(long, value_name = "PATH")]
    pub columns: Option<PathBuf>,

    /// Buffered rows per session before an automatic flush
    #[arg(long, default_value = "1000")]
    pub flush_rows: usize,
}

impl ReplayOpts {
    /// Per-event pacing delay; zero disables pacing.
    pub fn delay(&self) -> Option<Duration> {
        if self.delay_ms > 0 {
            Some(Duration::from_millis(self.delay_ms))
        } else {
            None
        }
    }

    /// Record timestamp policy.
    pub fn timestamp_policy(&self) -> TimestampPolicy {
        if self.timestamp_from_file {
            TimestampPolicy::FromFile
        } else {
            TimestampPolicy::ServerAssigned
        }
    }
}
