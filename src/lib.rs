//! Concurrent N1QL load generator.
//!
//! Reads a list of statements, then runs one worker per configured thread.
//! Worker `i` opens its own connection, binds a sliding time window to
//! statement `i`, and prints the decoded rows as indented JSON.

use std::sync::Arc;

pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod logging;
pub mod report;
pub mod statements;
pub mod value;
pub mod window;

pub use config::Args;
pub use dispatch::{dispatch, DispatchSummary};
pub use error::{Error, Result};

use endpoint::N1qlConnector;
use executor::WorkerContext;
use report::StdoutSink;

/// Loads the statements, builds a runtime with one scheduler thread per
/// worker and dispatches the workers against the N1QL service.
pub fn run(args: &Args) -> Result<DispatchSummary> {
    let statements = statements::load_statements(&args.queryfile)?;
    if args.threads > statements.len() {
        tracing::warn!(
            threads = args.threads,
            statements = statements.len(),
            "More workers than statements, extra workers will idle"
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.threads.max(1))
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;

    let ctx = Arc::new(WorkerContext {
        connector: N1qlConnector,
        server: args.server.clone(),
        connection: args.connection_config(),
        window: args.window_config(),
        statements,
        sink: Arc::new(StdoutSink),
    });

    runtime.block_on(dispatch(ctx, args.threads))
}
