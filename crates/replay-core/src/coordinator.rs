//! Job coordination: validation, dispatch and terminal aggregation.
//!
//! The coordinator builds the role table once, validates everything that
//! can be validated before dispatch, spawns one worker per assignment and
//! waits for every worker's terminal state. The first observed failure
//! cancels the remaining workers promptly, but the job still reports only
//! after the whole pool has terminated.

use crate::distribute::distribute;
use crate::encode::TimestampPolicy;
use crate::error::ReplayError;
use crate::sink::{IlpSink, DEFAULT_FLUSH_ROWS};
use crate::worker::{ReplayWorker, WorkerReport, WorkerStatus};
use ilp_client::{Sender, SenderConfig};
use replay_dataset::{Dataset, RoleConfig, RoleTable};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Settings for one replay job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Target table name; every record is addressed to it.
    pub table: String,
    /// Events to replay across the whole pool.
    pub total_events: u64,
    /// Worker pool size.
    pub num_workers: usize,
    /// Fixed per-event delay, local to each worker. `None` disables pacing.
    pub delay: Option<Duration>,
    /// Record timestamp policy.
    pub timestamp_policy: TimestampPolicy,
    /// Buffered rows per session before an automatic flush.
    pub flush_rows: usize,
    /// Transport configuration, handed through unmodified.
    pub sender: SenderConfig,
}

impl JobConfig {
    /// Build a config with defaults for pacing and flushing.
    pub fn new(table: impl Into<String>, total_events: u64, num_workers: usize, sender: SenderConfig) -> Self {
        Self {
            table: table.into(),
            total_events,
            num_workers,
            delay: None,
            timestamp_policy: TimestampPolicy::default(),
            flush_rows: DEFAULT_FLUSH_ROWS,
            sender,
        }
    }
}

/// Aggregate outcome of a replay job.
///
/// Present only once every worker has reached a terminal state. Worker
/// failures do not surface as an `Err` from [`run_job`]; they are collected
/// here so the caller can map them to its own exit semantics.
#[derive(Debug)]
pub struct JobSummary {
    /// Per-worker terminal reports, ordered by worker id.
    pub reports: Vec<WorkerReport>,
    /// Events submitted to the transport across the pool.
    pub total_events_sent: u64,
    /// Wall-clock duration of the whole job.
    pub elapsed: Duration,
    first_failed_worker: Option<usize>,
}

impl JobSummary {
    /// True when every worker completed its full assignment.
    pub fn is_success(&self) -> bool {
        self.reports.iter().all(WorkerReport::is_completed)
    }

    /// The first failure observed by the coordinator, if any.
    pub fn first_failure(&self) -> Option<&WorkerReport> {
        let id = self.first_failed_worker?;
        self.reports.iter().find(|r| r.worker_id == id)
    }

    /// Aggregate send rate.
    pub fn events_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.total_events_sent as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Validate configuration and dataset, then run the worker pool to
/// completion.
///
/// Configuration problems fail here, before any worker starts. Worker
/// failures are collected into the [`JobSummary`].
pub async fn run_job(
    config: &JobConfig,
    dataset: Arc<Dataset>,
    roles: &RoleConfig,
) -> Result<JobSummary, ReplayError> {
    let role_table = Arc::new(validate(config, &dataset, roles)?);

    let assignments = distribute(config.total_events, config.num_workers);

    // Build every session up front so a transport configuration problem
    // still counts as failing before dispatch.
    let mut senders = Vec::with_capacity(assignments.len());
    for _ in &assignments {
        let sender = Sender::connect(&config.sender)
            .map_err(|e| ReplayError::Config(format!("failed to initialize transport: {e}")))?;
        senders.push(sender);
    }

    info!(
        "Dispatching {} workers for {} events into '{}'",
        config.num_workers, config.total_events, config.table
    );

    let started = Instant::now();
    let cancel = CancellationToken::new();
    let mut join_set = JoinSet::new();

    for (assignment, sender) in assignments.into_iter().zip(senders) {
        let worker = ReplayWorker::new(
            assignment,
            Arc::clone(&dataset),
            Arc::clone(&role_table),
            config.timestamp_policy,
            config.delay,
            cancel.child_token(),
        );
        let sink = IlpSink::new(sender, &config.table).with_flush_rows(config.flush_rows);
        join_set.spawn(worker.run(sink));
    }

    let mut reports: Vec<WorkerReport> = Vec::with_capacity(config.num_workers);
    let mut first_failed_worker = None;

    while let Some(joined) = join_set.join_next().await {
        let report =
            joined.map_err(|e| ReplayError::Internal(format!("worker task failed: {e}")))?;

        if let WorkerStatus::Failed(ref cause) = report.status {
            error!("Worker {} failed: {cause}", report.worker_id);
            if first_failed_worker.is_none() {
                first_failed_worker = Some(report.worker_id);
                cancel.cancel();
            }
        }
        reports.push(report);
    }

    reports.sort_by_key(|r| r.worker_id);
    let total_events_sent: u64 = reports.iter().map(|r| r.events_sent).sum();
    let elapsed = started.elapsed();

    let summary = JobSummary {
        reports,
        total_events_sent,
        elapsed,
        first_failed_worker,
    };

    if summary.is_success() {
        info!(
            "All workers completed: {} events in {:?} ({:.2} events/sec)",
            summary.total_events_sent,
            summary.elapsed,
            summary.events_per_second()
        );
    } else {
        error!(
            "Replay finished with failures: {} events sent in {:?}",
            summary.total_events_sent, summary.elapsed
        );
    }

    Ok(summary)
}

/// Pre-dispatch validation; also builds the role table used by every worker.
fn validate(
    config: &JobConfig,
    dataset: &Dataset,
    roles: &RoleConfig,
) -> Result<RoleTable, ReplayError> {
    if config.total_events == 0 {
        return Err(ReplayError::Config(
            "total events must be greater than zero".to_string(),
        ));
    }
    if config.num_workers == 0 {
        return Err(ReplayError::Config(
            "worker count must be greater than zero".to_string(),
        ));
    }
    if dataset.row_count() == 0 {
        return Err(ReplayError::Config("dataset has no data rows".to_string()));
    }

    let role_table = RoleTable::new(dataset.header(), roles);
    if config.timestamp_policy == TimestampPolicy::FromFile
        && role_table.timestamp_index().is_none()
    {
        return Err(ReplayError::Config(format!(
            "dataset has no '{}' column but timestamp-from-file was requested",
            roles.timestamp_column
        )));
    }

    Ok(role_table)
}
