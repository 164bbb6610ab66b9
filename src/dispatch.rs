//! Fan-out of one worker per thread and the join over all of them.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::endpoint::Connector;
use crate::error::{Error, Result};
use crate::executor::WorkerContext;

/// Completion counts observed by the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Workers that signaled completion.
    pub completed: usize,
    /// Workers among them that printed a report.
    pub reported: usize,
}

/// Spawns `threads` workers, worker `i` bound to statement `i`, and waits
/// for every one of them.
///
/// The first fatal error aborts the remaining workers and is returned.
pub async fn dispatch<C: Connector>(
    ctx: Arc<WorkerContext<C>>,
    threads: usize,
) -> Result<DispatchSummary> {
    info!(
        threads,
        statements = ctx.statements.len(),
        server = %ctx.server,
        "Dispatching workers"
    );

    let mut workers = JoinSet::new();
    for index in 0..threads {
        let ctx = ctx.clone();
        workers.spawn(async move { (index, ctx.run_worker(index).await) });
    }

    let mut summary = DispatchSummary::default();
    while let Some(joined) = workers.join_next().await {
        let (index, outcome) = match joined {
            Ok(done) => done,
            Err(e) => {
                workers.abort_all();
                return Err(Error::WorkerPanicked(e.to_string()));
            }
        };

        match outcome {
            Ok(reported) => {
                summary.completed += 1;
                summary.reported += usize::from(reported);
            }
            Err(e) if e.is_fatal() => {
                error!(worker = index, error = %e, "Worker failed, aborting run");
                workers.abort_all();
                return Err(e);
            }
            Err(e) => {
                error!(worker = index, error = %e, "Worker failed");
                summary.completed += 1;
            }
        }
    }

    info!(
        completed = summary.completed,
        reported = summary.reported,
        "All workers done"
    );
    Ok(summary)
}
