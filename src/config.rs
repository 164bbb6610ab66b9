//! Command line arguments and the connection settings derived from them.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use url::Url;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER: &str = "http://localhost:8093";
pub const DEFAULT_THREADS: usize = 10;
pub const DEFAULT_QUERY_FILE: &str = "query_file.txt";
pub const DEFAULT_DIFF_SECS: i64 = 100;
pub const DEFAULT_LAG_SECS: i64 = 60;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 1000;
pub const DEFAULT_USER: &str = "admin:Administrator";
pub const DEFAULT_PASSWORD: &str = "asdasd";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Replay one time-windowed N1QL query per worker against a query service"
)]
pub struct Args {
    /// Query service URL
    #[arg(long, default_value = DEFAULT_SERVER)]
    pub server: Url,

    /// Number of concurrent workers; worker i runs line i of the query file
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// File containing one select statement per line
    #[arg(long, default_value = DEFAULT_QUERY_FILE)]
    pub queryfile: PathBuf,

    /// Width of the time window in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_DIFF_SECS,
        allow_negative_numbers = true
    )]
    pub diff: i64,

    /// Offset of the window end from now, in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_LAG_SECS,
        allow_negative_numbers = true
    )]
    pub lag: i64,

    /// Identity sent in the query credentials
    #[arg(long, default_value = DEFAULT_USER)]
    pub user: String,

    /// Secret sent in the query credentials
    #[arg(long, default_value = DEFAULT_PASSWORD)]
    pub password: String,

    /// Server-side query timeout in seconds
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS)]
    pub query_timeout: u64,
}

impl Args {
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            query_timeout: Duration::from_secs(self.query_timeout),
            credentials: vec![Credential::new(&self.user, &self.password)],
        }
    }

    pub const fn window_config(&self) -> WindowConfig {
        WindowConfig {
            diff: self.diff,
            lag: self.lag,
        }
    }
}

// ============================================================================
// Connection settings
// ============================================================================

/// One identity/secret pair, serialized the way the query service expects
/// entries of its `creds` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub user: String,
    pub pass: String,
}

impl Credential {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

/// Session settings applied to every query issued over a connection.
///
/// Built once per run and handed to each connect call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub query_timeout: Duration,
    pub credentials: Vec<Credential>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            credentials: vec![Credential::new(DEFAULT_USER, DEFAULT_PASSWORD)],
        }
    }
}

impl ConnectionConfig {
    /// Timeout in the duration syntax of the query service, e.g. `1000s`.
    pub fn timeout_param(&self) -> String {
        format!("{}s", self.query_timeout.as_secs())
    }
}

/// Width and lag of the per-query time window, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub diff: i64,
    pub lag: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            diff: DEFAULT_DIFF_SECS,
            lag: DEFAULT_LAG_SECS,
        }
    }
}
