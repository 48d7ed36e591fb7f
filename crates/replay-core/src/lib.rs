//! Replay engine for telemetry-replay.
//!
//! This crate owns the logic with real invariants:
//!
//! - [`distribute`] - deterministic partitioning of the target event count
//!   across the worker pool, with exact coverage and at most a one-event
//!   imbalance
//! - [`encode_event`] - row-to-record conversion respecting the wire's
//!   symbol-before-field ordering and the role-dependent type coercions
//! - [`ReplayWorker`] - the paced replay loop, one exclusive transport
//!   session per worker
//! - [`run_job`] - pre-dispatch validation, worker dispatch, prompt
//!   sibling cancellation on first failure, and terminal aggregation into
//!   a [`JobSummary`]
//!
//! The dataset and role table are computed once and shared read-only by
//! every worker; nothing here takes a lock after dispatch.

mod coordinator;
mod distribute;
mod encode;
mod error;
mod sink;
mod worker;

pub use coordinator::{run_job, JobConfig, JobSummary};
pub use distribute::{distribute, WorkerAssignment};
pub use encode::{
    encode_event, parse_bool, parse_long_flexible, Event, EventTimestamp, FieldValue,
    TimestampPolicy,
};
pub use error::ReplayError;
pub use sink::{IlpSink, RecordSink, DEFAULT_FLUSH_ROWS};
pub use worker::{ReplayWorker, WorkerReport, WorkerStatus};
