//! Intra-day session samples
//!
//! A bounded ring buffer of per-poll observations used for short-window
//! views. The buffer is ephemeral: it is not persisted and starts empty on
//! every restart, which is fine because daily metrics never depend on it.

use crate::counters::RawCounters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity of the session ring buffer
pub const DEFAULT_SESSION_CAPACITY: usize = 100;

/// One per-poll observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPoint {
    /// Instant of the observation
    pub timestamp: DateTime<Utc>,
    /// Total requests at that instant
    pub total: u64,
    /// Backend request total at that instant
    pub backend: u64,
    /// Client action total at that instant
    pub client: u64,
}

impl SessionPoint {
    /// Capture a point from a counters payload
    pub fn observe(timestamp: DateTime<Utc>, counters: &RawCounters) -> Self {
        Self {
            timestamp,
            total: counters.total_requests,
            backend: counters.backend_total(),
            client: counters.client_total(),
        }
    }
}

/// Append-only bounded buffer of session points
#[derive(Debug, Clone)]
pub struct SessionBuffer {
    capacity: usize,
    points: VecDeque<SessionPoint>,
}

impl SessionBuffer {
    /// Create a buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }

    /// Create a buffer with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, points: VecDeque::with_capacity(capacity) }
    }

    /// Append a point, evicting the oldest when full
    pub fn push(&mut self, point: SessionPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Points observed at or after `cutoff`, oldest first
    pub fn since(&self, cutoff: DateTime<Utc>) -> Vec<SessionPoint> {
        self.points.iter().filter(|p| p.timestamp >= cutoff).copied().collect()
    }

    /// All buffered points, oldest first
    pub fn points(&self) -> impl Iterator<Item = &SessionPoint> {
        self.points.iter()
    }

    /// Number of buffered points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop every buffered point
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for SessionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn point(timestamp: DateTime<Utc>, total: u64) -> SessionPoint {
        SessionPoint { timestamp, total, backend: 0, client: 0 }
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut buffer = SessionBuffer::with_capacity(3);
        let now = Utc::now();

        for i in 0..10 {
            buffer.push(point(now, i));
        }

        assert_eq!(buffer.len(), 3);
        // The three newest survive
        let totals: Vec<u64> = buffer.points().map(|p| p.total).collect();
        assert_eq!(totals, vec![7, 8, 9]);
    }

    #[test]
    fn test_since_filters_by_timestamp() {
        let mut buffer = SessionBuffer::new();
        let now = Utc::now();

        buffer.push(point(now - Duration::hours(2), 1));
        buffer.push(point(now - Duration::minutes(30), 2));
        buffer.push(point(now, 3));

        let last_hour = buffer.since(now - Duration::hours(1));
        assert_eq!(last_hour.len(), 2);
        assert_eq!(last_hour[0].total, 2);
    }

    #[test]
    fn test_observe_captures_counter_totals() {
        let counters = RawCounters::from_value(serde_json::json!({
            "total_requests": 50,
            "backend": {"/a": 30},
            "client": {"x": 7}
        }))
        .unwrap();

        let point = SessionPoint::observe(Utc::now(), &counters);

        assert_eq!(point.total, 50);
        assert_eq!(point.backend, 30);
        assert_eq!(point.client, 7);
    }
}
