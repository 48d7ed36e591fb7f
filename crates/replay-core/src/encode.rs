//! Row-to-record encoding.
//!
//! One dataset row becomes one wire record. Two passes over the header keep
//! the ordering the wire format requires: all symbol columns are emitted
//! before any boolean or numeric field. Cells that are empty after trimming
//! are skipped silently in both passes.

use crate::error::ReplayError;
use chrono::{DateTime, Utc};
use replay_dataset::{ColumnRole, RoleTable};

/// How record timestamps are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Every record asks the server to assign the ingestion time.
    #[default]
    ServerAssigned,
    /// Use the dataset's timestamp column; empty cells fall back to
    /// server-assigned time.
    FromFile,
}

/// A field value coerced from a dataset cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// Boolean measurement.
    Bool(bool),
    /// 64-bit integer measurement.
    Long(i64),
}

/// The timestamp decision for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTimestamp {
    /// Assign wall-clock time at the server when the record lands.
    ServerAssigned,
    /// Use this explicit instant.
    At(DateTime<Utc>),
}

/// One wire record derived from a dataset row: symbols in header order,
/// then fields in header order, then the timestamp decision.
///
/// Events borrow from the dataset and exist only between encoding and
/// submission; they are never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'a> {
    /// Symbol columns, trimmed, empty cells omitted.
    pub symbols: Vec<(&'a str, &'a str)>,
    /// Boolean and numeric columns, empty cells omitted.
    pub fields: Vec<(&'a str, FieldValue)>,
    /// Timestamp decision.
    pub timestamp: EventTimestamp,
}

/// Encode one dataset row into an [`Event`].
///
/// Numeric cells that resist the flexible parse and malformed timestamp
/// cells are the only error paths; boolean coercion is total.
pub fn encode_event<'a>(
    row: &'a [String],
    header: &'a [String],
    roles: &RoleTable,
    policy: TimestampPolicy,
) -> Result<Event<'a>, ReplayError> {
    let mut symbols = Vec::new();
    let mut fields = Vec::new();

    // Symbol pass: symbols must precede fields on the wire.
    for (idx, name) in header.iter().enumerate() {
        if roles.role(idx) != ColumnRole::Symbol {
            continue;
        }
        let value = row[idx].trim();
        if value.is_empty() {
            continue;
        }
        symbols.push((name.as_str(), value));
    }

    // Field pass: everything that is neither timestamp nor symbol.
    for (idx, name) in header.iter().enumerate() {
        let role = roles.role(idx);
        if role == ColumnRole::Timestamp || role == ColumnRole::Symbol {
            continue;
        }
        let value = row[idx].trim();
        if value.is_empty() {
            continue;
        }
        match role {
            ColumnRole::Boolean => fields.push((name.as_str(), FieldValue::Bool(parse_bool(value)))),
            _ => {
                let parsed =
                    parse_long_flexible(value).ok_or_else(|| ReplayError::NumericParse {
                        column: name.clone(),
                        value: value.to_string(),
                    })?;
                fields.push((name.as_str(), FieldValue::Long(parsed)));
            }
        }
    }

    let timestamp = decide_timestamp(row, header, roles, policy)?;

    Ok(Event {
        symbols,
        fields,
        timestamp,
    })
}

/// Total boolean coercion: only the literal token `true`, case-insensitive,
/// is true; every other value is false. Never fails.
pub fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Flexible 64-bit integer parse: integer syntax first, then floating point
/// (accepting scientific notation) truncated toward zero.
///
/// Magnitudes beyond the f64 safe-integer range lose precision in the
/// fallback path; that limitation is inherited from the data producers.
pub fn parse_long_flexible(value: &str) -> Option<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }
    value.parse::<f64>().ok().map(|d| d as i64)
}

fn decide_timestamp(
    row: &[String],
    header: &[String],
    roles: &RoleTable,
    policy: TimestampPolicy,
) -> Result<EventTimestamp, ReplayError> {
    if policy != TimestampPolicy::FromFile {
        return Ok(EventTimestamp::ServerAssigned);
    }
    let Some(idx) = roles.timestamp_index() else {
        return Ok(EventTimestamp::ServerAssigned);
    };
    let cell = row[idx].trim();
    if cell.is_empty() {
        return Ok(EventTimestamp::ServerAssigned);
    }

    let parsed = DateTime::parse_from_rfc3339(cell)
        .map_err(|source| ReplayError::TimestampParse {
            column: header[idx].clone(),
            value: cell.to_string(),
            source,
        })?
        .with_timezone(&Utc);

    // The wire carries nanoseconds; reject instants that do not fit.
    if parsed.timestamp_nanos_opt().is_none() {
        return Err(ReplayError::TimestampRange {
            column: header[idx].clone(),
            value: cell.to_string(),
        });
    }

    Ok(EventTimestamp::At(parsed))
}
