//! Transport seam between the replay engine and the wire client.

use crate::encode::{Event, EventTimestamp, FieldValue};
use crate::error::ReplayError;
use async_trait::async_trait;
use ilp_client::{Buffer, IlpError, Sender};

/// Default number of buffered rows that triggers an automatic flush.
pub const DEFAULT_FLUSH_ROWS: usize = 1000;

/// Destination for encoded records.
///
/// Production workers write through [`IlpSink`]; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait RecordSink: Send {
    /// Append one record, flushing internally as needed.
    async fn submit(&mut self, event: &Event<'_>) -> Result<(), ReplayError>;

    /// Drain any buffered records to the endpoint.
    async fn flush(&mut self) -> Result<(), ReplayError>;
}

#[async_trait]
impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    async fn submit(&mut self, event: &Event<'_>) -> Result<(), ReplayError> {
        (**self).submit(event).await
    }

    async fn flush(&mut self) -> Result<(), ReplayError> {
        (**self).flush().await
    }
}

/// [`RecordSink`] writing ILP rows through an exclusively-owned [`Sender`]
/// session.
pub struct IlpSink {
    sender: Sender,
    buffer: Buffer,
    table: String,
    flush_rows: usize,
}

impl IlpSink {
    /// Wrap a sender session, addressing all rows to `table`.
    pub fn new(sender: Sender, table: impl Into<String>) -> Self {
        Self {
            sender,
            buffer: Buffer::new(),
            table: table.into(),
            flush_rows: DEFAULT_FLUSH_ROWS,
        }
    }

    /// Set the buffered-row threshold for automatic flushes.
    pub fn with_flush_rows(mut self, flush_rows: usize) -> Self {
        self.flush_rows = flush_rows.max(1);
        self
    }
}

#[async_trait]
impl RecordSink for IlpSink {
    async fn submit(&mut self, event: &Event<'_>) -> Result<(), ReplayError> {
        self.buffer.table(&self.table)?;

        for (name, value) in &event.symbols {
            self.buffer.symbol(name, value)?;
        }
        for (name, value) in &event.fields {
            match value {
                FieldValue::Bool(b) => {
                    self.buffer.column_bool(name, *b)?;
                }
                FieldValue::Long(v) => {
                    self.buffer.column_i64(name, *v)?;
                }
            }
        }

        match event.timestamp {
            EventTimestamp::ServerAssigned => self.buffer.at_server()?,
            EventTimestamp::At(ts) => {
                // Range was already checked at encode time.
                let nanos = ts.timestamp_nanos_opt().ok_or_else(|| {
                    IlpError::Protocol(format!("timestamp {ts} outside nanosecond range"))
                })?;
                self.buffer.at(nanos)?;
            }
        }

        if self.buffer.row_count() >= self.flush_rows {
            self.sender.flush(&mut self.buffer).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ReplayError> {
        self.sender.flush(&mut self.buffer).await?;
        Ok(())
    }
}
