//! Error types for statement loading, endpoint access and result decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong during a run.
///
/// The variants split into two groups. Setup failures (reading the statement
/// file, opening a connection, the liveness check, submitting a query) abort
/// the whole run; see [`Error::is_fatal`]. The rest are local to one worker and
/// are logged while the worker carries on.
#[derive(Debug, Error)]
pub enum Error {
    /// The statement file could not be read.
    #[error("unable to read statements from {path:?}: {source}")]
    ReadStatements {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client for a connection could not be built or the server
    /// address could not be turned into an endpoint URL.
    #[error("connection error: {0}")]
    Connect(String),

    /// The endpoint did not answer the liveness check.
    #[error("liveness check against {endpoint} failed: {reason}")]
    Liveness { endpoint: String, reason: String },

    /// The query service refused or failed the statement.
    #[error("query {statement:?} failed: {reason}")]
    Query { statement: String, reason: String },

    /// The result carried no usable column names.
    #[error("no columns returned: {0}")]
    Columns(String),

    /// One result row could not be scanned into column values.
    #[error("row {row} could not be decoded: {reason}")]
    Decode { row: usize, reason: String },

    /// The service reported an error after the rows were delivered.
    #[error("error scanning rows: {0}")]
    Cursor(String),

    /// The collected rows could not be rendered as JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A report could not be written out.
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),

    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),

    /// A worker task panicked or was torn down by the runtime.
    #[error("worker did not complete: {0}")]
    WorkerPanicked(String),
}

impl Error {
    /// Returns true if this error must stop the whole run.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ReadStatements { .. }
                | Self::Connect(_)
                | Self::Liveness { .. }
                | Self::Query { .. }
                | Self::Runtime(_)
                | Self::WorkerPanicked(_)
        )
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
