//! Per-query reports and where they are written.

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::error::Result;

/// One decoded row: column name to normalized value, in column order.
pub type ResultRow = Map<String, Value>;

/// Everything a worker prints once its statement has run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub index: usize,
    pub statement: String,
    pub rows: Vec<ResultRow>,
}

impl QueryReport {
    /// Rows as a JSON array indented by four spaces.
    pub fn rows_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.rows.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// The statement followed by its result set, as printed on stdout.
    pub fn render(&self) -> Result<String> {
        Ok(format!(
            "Query {} \n Result {} \n",
            self.statement,
            self.rows_json()?
        ))
    }
}

/// Destination for finished reports. Shared by all workers.
pub trait ReportSink: Send + Sync + 'static {
    fn emit(&self, report: &QueryReport) -> Result<()>;
}

/// Writes each report to standard output in a single locked write.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&self, report: &QueryReport) -> Result<()> {
        let text = report.render()?;
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Keeps reports in memory, in the order they were emitted.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<QueryReport>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<QueryReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ReportSink for CollectingSink {
    fn emit(&self, report: &QueryReport) -> Result<()> {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
        Ok(())
    }
}
