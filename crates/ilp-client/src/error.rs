//! Error types for the ILP client.

use thiserror::Error;

/// Errors raised by the ILP buffer and sender.
#[derive(Error, Debug)]
pub enum IlpError {
    /// Invalid sender configuration.
    #[error("Invalid sender configuration: {0}")]
    Config(String),

    /// A row was assembled in an order the wire format forbids.
    #[error("Protocol misuse: {0}")]
    Protocol(String),

    /// HTTP transport failure.
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the write outright.
    #[error("Server rejected write with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the server.
        body: String,
    },

    /// Retries were exhausted without a successful write.
    #[error("Write failed after retrying for {elapsed_ms} ms: {last_error}")]
    RetryTimeout {
        /// Total time spent retrying.
        elapsed_ms: u64,
        /// The final attempt's error.
        last_error: String,
    },
}
