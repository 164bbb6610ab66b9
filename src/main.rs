use std::process::ExitCode;

use clap::Parser;
use dash_query::{logging, run, Args};

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = logging::init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    tracing::info!(
        server = %args.server,
        threads = args.threads,
        queryfile = %args.queryfile.display(),
        diff = args.diff,
        lag = args.lag,
        "Starting query run"
    );

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::FAILURE
        }
    }
}
