//! The sliding time window bound to every query.

use chrono::{DateTime, Utc};

use crate::config::WindowConfig;

/// Unix timestamps (seconds) bounding a query: `[now - diff - lag, now - lag]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Window ending `lag` seconds before `now` and spanning `diff` seconds.
    pub fn ending_at(now: DateTime<Utc>, config: WindowConfig) -> Self {
        let end = now.timestamp() - config.lag;
        Self {
            start: end - config.diff,
            end,
        }
    }

    /// Window computed from the wall clock at the moment of the call.
    pub fn now(config: WindowConfig) -> Self {
        Self::ending_at(Utc::now(), config)
    }

    /// Positional arguments in submission order.
    pub const fn args(&self) -> [i64; 2] {
        [self.start, self.end]
    }
}
