//! ILP line buffer.
//!
//! Builds the InfluxDB-line-protocol text accepted by QuestDB-style
//! `/write` endpoints:
//!
//! ```text
//! table,sym1=a,sym2=b field1=42i,field2=t 1700000000000000000
//! ```
//!
//! Within a row, symbols must be appended before any field, and a row must
//! carry at least one column before it is finished with [`Buffer::at`] or
//! [`Buffer::at_server`].

use crate::error::IlpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    /// Not inside a row.
    Closed,
    /// Row started; only the table name written so far.
    Table,
    /// One or more symbols written.
    Symbols,
    /// One or more fields written.
    Fields,
}

/// Accumulates ILP rows until they are drained by a sender.
#[derive(Debug, Clone)]
pub struct Buffer {
    out: String,
    state: RowState,
    row_count: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            out: String::new(),
            state: RowState::Closed,
            row_count: 0,
        }
    }

    /// Start a new row addressed to `table`.
    pub fn table(&mut self, table: &str) -> Result<&mut Self, IlpError> {
        if self.state != RowState::Closed {
            return Err(IlpError::Protocol(
                "previous row was not finished".to_string(),
            ));
        }
        escape_name(&mut self.out, table);
        self.state = RowState::Table;
        Ok(self)
    }

    /// Append a symbol column. Symbols must precede all fields in a row.
    pub fn symbol(&mut self, name: &str, value: &str) -> Result<&mut Self, IlpError> {
        match self.state {
            RowState::Table | RowState::Symbols => {}
            RowState::Fields => {
                return Err(IlpError::Protocol(
                    "symbols must be written before fields".to_string(),
                ))
            }
            RowState::Closed => {
                return Err(IlpError::Protocol(
                    "symbol written outside a row".to_string(),
                ))
            }
        }
        self.out.push(',');
        escape_name(&mut self.out, name);
        self.out.push('=');
        escape_name(&mut self.out, value);
        self.state = RowState::Symbols;
        Ok(self)
    }

    /// Append a boolean field column.
    pub fn column_bool(&mut self, name: &str, value: bool) -> Result<&mut Self, IlpError> {
        self.field_prefix(name)?;
        self.out.push(if value { 't' } else { 'f' });
        Ok(self)
    }

    /// Append a 64-bit integer field column.
    pub fn column_i64(&mut self, name: &str, value: i64) -> Result<&mut Self, IlpError> {
        self.field_prefix(name)?;
        self.out.push_str(&value.to_string());
        self.out.push('i');
        Ok(self)
    }

    /// Finish the row with an explicit timestamp in nanoseconds.
    pub fn at(&mut self, nanos: i64) -> Result<(), IlpError> {
        self.check_finishable()?;
        self.out.push(' ');
        self.out.push_str(&nanos.to_string());
        self.finish_row();
        Ok(())
    }

    /// Finish the row, letting the server assign the ingestion timestamp.
    pub fn at_server(&mut self) -> Result<(), IlpError> {
        self.check_finishable()?;
        self.finish_row();
        Ok(())
    }

    /// Number of finished rows currently buffered.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Buffered byte length.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Buffered ILP text.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Discard all buffered rows.
    pub fn clear(&mut self) {
        self.out.clear();
        self.state = RowState::Closed;
        self.row_count = 0;
    }

    fn field_prefix(&mut self, name: &str) -> Result<(), IlpError> {
        match self.state {
            RowState::Table | RowState::Symbols => self.out.push(' '),
            RowState::Fields => self.out.push(','),
            RowState::Closed => {
                return Err(IlpError::Protocol(
                    "field written outside a row".to_string(),
                ))
            }
        }
        escape_name(&mut self.out, name);
        self.out.push('=');
        self.state = RowState::Fields;
        Ok(())
    }

    fn check_finishable(&self) -> Result<(), IlpError> {
        match self.state {
            RowState::Symbols | RowState::Fields => Ok(()),
            RowState::Table => Err(IlpError::Protocol("row has no columns".to_string())),
            RowState::Closed => Err(IlpError::Protocol(
                "timestamp written outside a row".to_string(),
            )),
        }
    }

    fn finish_row(&mut self) {
        self.out.push('\n');
        self.state = RowState::Closed;
        self.row_count += 1;
    }
}

/// Escape the characters that delimit ILP names and symbol values.
fn escape_name(out: &mut String, s: &str) {
    for c in s.chars() {
        if matches!(c, ',' | '=' | ' ' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}
