//! Replay worker: one transport session, one paced replay loop.
//!
//! A worker walks `Idle → Sending → Flushing → Done`. Any encode or
//! transport error short-circuits to `Failed`, and a coordinator-issued
//! cancellation ends the loop early with `Cancelled`. Workers never retry
//! beyond the transport session's own policy, and never coordinate send
//! order with one another; aggregate throughput is approximately
//! `num_workers / delay`, not globally rate-limited.

use crate::distribute::WorkerAssignment;
use crate::encode::{encode_event, TimestampPolicy};
use crate::error::ReplayError;
use crate::sink::RecordSink;
use replay_dataset::{Dataset, RoleTable};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal outcome of one worker.
#[derive(Debug)]
pub enum WorkerStatus {
    /// All assigned events were sent and flushed.
    Completed,
    /// The worker was cancelled after a sibling failed; buffered but
    /// unflushed records may be dropped.
    Cancelled,
    /// The worker failed; events already sent are not rolled back.
    Failed(ReplayError),
}

/// Terminal report of one worker.
#[derive(Debug)]
pub struct WorkerReport {
    /// Worker id.
    pub worker_id: usize,
    /// Events submitted to the transport before the terminal state.
    pub events_sent: u64,
    /// Wall-clock time from start to terminal state.
    pub elapsed: Duration,
    /// Terminal outcome.
    pub status: WorkerStatus,
}

impl WorkerReport {
    /// True when the worker sent and flushed everything it was assigned.
    pub fn is_completed(&self) -> bool {
        matches!(self.status, WorkerStatus::Completed)
    }
}

/// A replay worker cycling through the shared dataset.
///
/// Each worker owns its transport session exclusively and replays rows
/// deterministically from index zero: event `i` uses row `i % row_count`.
pub struct ReplayWorker {
    worker_id: usize,
    event_count: u64,
    dataset: Arc<Dataset>,
    roles: Arc<RoleTable>,
    policy: TimestampPolicy,
    delay: Option<Duration>,
    cancel: CancellationToken,
}

impl ReplayWorker {
    /// Build a worker for one assignment.
    pub fn new(
        assignment: WorkerAssignment,
        dataset: Arc<Dataset>,
        roles: Arc<RoleTable>,
        policy: TimestampPolicy,
        delay: Option<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            worker_id: assignment.worker_id,
            event_count: assignment.event_count,
            dataset,
            roles,
            policy,
            delay,
            cancel,
        }
    }

    /// Run the replay loop against an exclusively-owned sink.
    pub async fn run<S: RecordSink>(self, mut sink: S) -> WorkerReport {
        let started = Instant::now();
        info!("Worker {} will send {} events", self.worker_id, self.event_count);

        let mut events_sent = 0u64;
        let status = match self.send_loop(&mut sink, &mut events_sent).await {
            Ok(true) => {
                info!(
                    "Worker {} finished sending {} events",
                    self.worker_id, events_sent
                );
                WorkerStatus::Completed
            }
            Ok(false) => {
                info!(
                    "Worker {} cancelled after {} events",
                    self.worker_id, events_sent
                );
                WorkerStatus::Cancelled
            }
            Err(e) => {
                warn!(
                    "Worker {} failed after {} events: {e}",
                    self.worker_id, events_sent
                );
                WorkerStatus::Failed(e)
            }
        };

        WorkerReport {
            worker_id: self.worker_id,
            events_sent,
            elapsed: started.elapsed(),
            status,
        }
    }

    /// Returns `Ok(true)` on completion, `Ok(false)` on cancellation.
    async fn send_loop<S: RecordSink>(
        &self,
        sink: &mut S,
        events_sent: &mut u64,
    ) -> Result<bool, ReplayError> {
        let rows = self.dataset.rows();
        let header = self.dataset.header();
        let row_count = rows.len() as u64;

        for i in 0..self.event_count {
            if self.cancel.is_cancelled() {
                return Ok(false);
            }

            let row = &rows[(i % row_count) as usize];
            let event = encode_event(row, header, &self.roles, self.policy)?;
            sink.submit(&event).await?;
            *events_sent += 1;

            if let Some(delay) = self.delay {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Ok(false),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        debug!("Worker {} flushing", self.worker_id);
        sink.flush().await?;
        Ok(true)
    }
}
