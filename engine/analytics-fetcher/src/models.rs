use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Events emitted by the poller
#[derive(Debug, Clone, Serialize)]
pub enum PollEvent {
    /// Counters were fetched and folded into the day's snapshot
    Applied {
        date: NaiveDate,
        total: u64,
        timestamp: DateTime<Utc>,
    },

    /// A poll was already in flight; this one was rejected
    Skipped {
        timestamp: DateTime<Utc>,
    },

    /// The poll failed; stored data is untouched
    Failed {
        kind: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// Connectivity status shown by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerStatus {
    Online,
    Offline,
}
