//! Per-worker query execution: connect, run one statement, decode its rows.

use std::sync::Arc;

use tracing::{error, info, warn};
use url::Url;

use crate::config::{ConnectionConfig, WindowConfig};
use crate::endpoint::{Connection, Connector, Rows};
use crate::error::Result;
use crate::report::{QueryReport, ReportSink, ResultRow};
use crate::statements::Statements;
use crate::window::TimeWindow;

/// State shared read-only by every worker of a run.
pub struct WorkerContext<C> {
    pub connector: C,
    pub server: Url,
    pub connection: ConnectionConfig,
    pub window: WindowConfig,
    pub statements: Statements,
    pub sink: Arc<dyn ReportSink>,
}

impl<C: Connector> WorkerContext<C> {
    /// Runs worker `index` to completion.
    ///
    /// Connection, liveness and submission failures are returned; everything
    /// else is logged and the worker still completes. Returns whether a
    /// report was emitted.
    pub async fn run_worker(&self, index: usize) -> Result<bool> {
        let conn = self.connector.connect(&self.server, &self.connection).await?;
        conn.ping().await?;

        let Some(statement) = self.statements.get(index) else {
            warn!(
                worker = index,
                statements = self.statements.len(),
                "No statement for worker, idling"
            );
            return Ok(false);
        };

        let Some(report) = execute(&conn, index, statement, self.window).await? else {
            return Ok(false);
        };

        if let Err(e) = self.sink.emit(&report) {
            error!(worker = index, error = %e, "Failed to print result");
        }
        info!(worker = index, rows = report.rows.len(), "Query complete");
        Ok(true)
    }
}

/// Runs one statement over `conn` with a freshly computed window.
///
/// Returns `None` when the result names no columns.
pub async fn execute<T: Connection + ?Sized>(
    conn: &T,
    index: usize,
    statement: &str,
    window: WindowConfig,
) -> Result<Option<QueryReport>> {
    let window = TimeWindow::now(window);
    info!(
        worker = index,
        start = window.start,
        end = window.end,
        "Submitting query"
    );

    let mut rows = conn.query(statement, window).await?;

    let columns = match rows.columns() {
        Ok(columns) => columns,
        Err(e) => {
            warn!(worker = index, error = %e, "No columns returned");
            return Ok(None);
        }
    };

    let decoded = collect_rows(index, &columns, &mut rows);
    if let Some(e) = rows.err() {
        error!(worker = index, error = %e, "Error scanning rows");
    }

    Ok(Some(QueryReport {
        index,
        statement: statement.to_owned(),
        rows: decoded,
    }))
}

fn collect_rows(index: usize, columns: &[String], rows: &mut Rows) -> Vec<ResultRow> {
    let mut out = Vec::new();
    while let Some(scanned) = rows.next_row() {
        let values = match scanned {
            Ok(values) => values,
            Err(e) => {
                error!(worker = index, error = %e, "Skipping row");
                continue;
            }
        };
        let row: ResultRow = columns
            .iter()
            .cloned()
            .zip(values.into_iter().map(|v| v.normalize()))
            .collect();
        out.push(row);
    }
    out
}
