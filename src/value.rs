//! Decoded column values and their normalized JSON form.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

/// Layout used for timestamps in printed results.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Printed in place of a null or missing column value.
pub const NULL_TEXT: &str = "NULL";

/// One value scanned out of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    Other(Value),
}

impl ColumnValue {
    /// Scans a raw JSON value from the query service.
    ///
    /// Strings holding an RFC 3339 timestamp become [`ColumnValue::Timestamp`];
    /// every other string is kept as its UTF-8 payload.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(ts) => Self::Timestamp(ts),
                Err(_) => Self::Bytes(s.into_bytes()),
            },
            other => Self::Other(other),
        }
    }

    /// Converts the value into its printable JSON shape.
    pub fn normalize(self) -> Value {
        match self {
            Self::Null => Value::String(NULL_TEXT.to_owned()),
            Self::Bool(b) => Value::Bool(b),
            Self::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            Self::Timestamp(ts) => Value::String(ts.format(TIMESTAMP_FORMAT).to_string()),
            Self::Other(v) => v,
        }
    }
}
