//! Minimal ILP-over-HTTP ingestion client.
//!
//! This crate is the transport side of telemetry-replay: a text [`Buffer`]
//! that assembles InfluxDB-line-protocol rows in the order QuestDB-style
//! endpoints require (symbols before fields, optional trailing nanosecond
//! timestamp), and an async [`Sender`] that drains buffers over HTTP with
//! client-side address failover and a bounded retry budget.
//!
//! # Example
//!
//! ```ignore
//! use ilp_client::{Buffer, Sender, SenderConfig};
//!
//! let config = SenderConfig::from_addr_list("questdb:9000")?;
//! let mut sender = Sender::connect(&config)?;
//!
//! let mut buffer = Buffer::new();
//! buffer.table("telemetry")?
//!     .symbol("host", "edge-1")?
//!     .column_i64("bytes", 42)?
//!     .at_server()?;
//!
//! sender.flush(&mut buffer).await?;
//! ```

mod buffer;
mod error;
mod sender;

pub use buffer::Buffer;
pub use error::IlpError;
pub use sender::{Auth, Sender, SenderConfig, DEFAULT_RETRY_TIMEOUT};
