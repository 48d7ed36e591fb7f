//! Error taxonomy for replay jobs.
//!
//! Configuration errors are detected before any worker starts and abort the
//! whole job. Parse and transport errors are local to the worker that hits
//! them; they never interrupt siblings, and progress already sent is never
//! rolled back.

use ilp_client::IlpError;
use thiserror::Error;

/// Errors surfaced by replay jobs and workers.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Invalid or missing required input, detected before dispatch.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A numeric cell could not be coerced to a 64-bit integer.
    #[error("Column '{column}': cannot parse '{value}' as an integer")]
    NumericParse {
        /// Column name.
        column: String,
        /// Offending cell value, already trimmed.
        value: String,
    },

    /// A timestamp cell could not be parsed as an RFC 3339 instant.
    #[error("Column '{column}': cannot parse '{value}' as a timestamp: {source}")]
    TimestampParse {
        /// Column name.
        column: String,
        /// Offending cell value, already trimmed.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// A timestamp cell parsed but cannot be represented in nanoseconds.
    #[error("Column '{column}': timestamp '{value}' is outside the representable range")]
    TimestampRange {
        /// Column name.
        column: String,
        /// Offending cell value, already trimmed.
        value: String,
    },

    /// Failure to write or flush a record.
    #[error("Transport error: {0}")]
    Transport(#[from] IlpError),

    /// A worker task could not be joined.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReplayError {
    /// True for per-event data coercion failures.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            ReplayError::NumericParse { .. }
                | ReplayError::TimestampParse { .. }
                | ReplayError::TimestampRange { .. }
        )
    }
}
