//! Access to the query service: connection traits and the row cursor.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::value::ColumnValue;
use crate::window::TimeWindow;

mod http;

pub use http::{N1qlConnection, N1qlConnector};

/// Opens connections to a query service. Every call yields a connection
/// owned by the caller alone.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    async fn connect(&self, server: &Url, config: &ConnectionConfig) -> Result<Self::Conn>;
}

/// A single worker's connection.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Liveness check; fails with [`Error::Liveness`].
    async fn ping(&self) -> Result<()>;

    /// Submits `statement` with the window bounds as its two positional
    /// arguments; fails with [`Error::Query`].
    async fn query(&self, statement: &str, window: TimeWindow) -> Result<Rows>;
}

/// Cursor over a fetched result set.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Value>,
    position: usize,
    deferred: Option<String>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<Value>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
            position: 0,
            deferred: None,
        }
    }

    /// Attaches an error the service reported after delivering rows.
    pub fn with_deferred_error(mut self, reason: impl Into<String>) -> Self {
        self.deferred = Some(reason.into());
        self
    }

    /// Column names of the result, in service order.
    pub fn columns(&self) -> Result<Vec<String>> {
        if self.columns.is_empty() {
            return Err(Error::Columns("result signature names no columns".into()));
        }
        Ok(self.columns.clone())
    }

    /// Scans the next row into one value per column.
    pub fn next_row(&mut self) -> Option<Result<Vec<ColumnValue>>> {
        let row = self.rows.next()?;
        let position = self.position;
        self.position += 1;
        Some(scan_row(&self.columns, row, position))
    }

    /// The deferred cursor error, if any.
    pub fn err(&self) -> Option<Error> {
        self.deferred.clone().map(Error::Cursor)
    }
}

fn scan_row(columns: &[String], row: Value, position: usize) -> Result<Vec<ColumnValue>> {
    match row {
        Value::Object(mut fields) => Ok(columns
            .iter()
            .map(|col| {
                fields
                    .remove(col)
                    .map_or(ColumnValue::Null, ColumnValue::from_json)
            })
            .collect()),
        raw if columns.len() == 1 => Ok(vec![ColumnValue::from_json(raw)]),
        raw => Err(Error::Decode {
            row: position,
            reason: format!(
                "expected an object for {} columns, got {raw}",
                columns.len()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_signature_has_no_columns() {
        let rows = Rows::new(Vec::new(), vec![json!({"a": 1})]);
        assert!(matches!(rows.columns(), Err(Error::Columns(_))));
    }

    #[test]
    fn scans_object_rows_by_column_name() {
        let mut rows = Rows::new(
            cols(&["id", "name"]),
            vec![json!({"name": "x", "id": 7})],
        );
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(
            row,
            vec![
                ColumnValue::Other(json!(7)),
                ColumnValue::Bytes(b"x".to_vec())
            ]
        );
        assert!(rows.next_row().is_none());
    }

    #[test]
    fn missing_field_scans_as_null() {
        let mut rows = Rows::new(cols(&["id", "name"]), vec![json!({"id": 1})]);
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row[1], ColumnValue::Null);
    }

    #[test]
    fn raw_row_fills_a_single_column() {
        let mut rows = Rows::new(cols(&["$1"]), vec![json!(3)]);
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row, vec![ColumnValue::Other(json!(3))]);
    }

    #[test]
    fn raw_row_under_several_columns_fails_alone() {
        let mut rows = Rows::new(
            cols(&["a", "b"]),
            vec![json!(3), json!({"a": 1, "b": 2})],
        );
        assert!(matches!(
            rows.next_row(),
            Some(Err(Error::Decode { row: 0, .. }))
        ));
        assert!(rows.next_row().unwrap().is_ok());
    }

    #[test]
    fn deferred_error_surfaces_after_rows() {
        let rows = Rows::new(cols(&["a"]), Vec::new())
            .with_deferred_error("timeout");
        assert!(matches!(
            rows.err(),
            Some(Error::Cursor(msg)) if msg == "timeout"
        ));
        assert!(Rows::new(cols(&["a"]), Vec::new()).err().is_none());
    }
}
