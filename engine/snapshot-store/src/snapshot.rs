//! Daily snapshot records
//!
//! One record exists per calendar date. Repeated polls within a date are
//! folded into the existing record with a monotonic-max merge, so displayed
//! counts never regress within a day even when polling cycles race or repeat.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated analytics for one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// Calendar date, the primary key (serialized as `YYYY-MM-DD`)
    pub date: NaiveDate,

    /// Instant of the last update to this record
    pub timestamp: DateTime<Utc>,

    /// Total requests reported for this date
    pub total: u64,

    /// Sum of all backend endpoint counts
    pub backend: u64,

    /// Sum of all client action counts
    pub client: u64,

    /// App launch counter (the `"user launch"` client action)
    pub user_launch: u64,

    /// Advertising counters, keyed by the full client action name
    pub ad_metrics: BTreeMap<String, u64>,
}

impl DailySnapshot {
    /// Create an empty record for a date
    pub fn new(date: NaiveDate, timestamp: DateTime<Utc>) -> Self {
        Self {
            date,
            timestamp,
            total: 0,
            backend: 0,
            client: 0,
            user_launch: 0,
            ad_metrics: BTreeMap::new(),
        }
    }

    /// Fold another observation of the same date into this record.
    ///
    /// Every numeric field becomes `max(self, other)`; ad counters missing on
    /// either side default to 0 before the max. The caller is responsible for
    /// stamping `timestamp` afterwards.
    pub fn merge_max(&mut self, other: &DailySnapshot) {
        debug_assert_eq!(self.date, other.date);

        self.total = self.total.max(other.total);
        self.backend = self.backend.max(other.backend);
        self.client = self.client.max(other.client);
        self.user_launch = self.user_launch.max(other.user_launch);

        for (name, &count) in &other.ad_metrics {
            let entry = self.ad_metrics.entry(name.clone()).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    /// Sum of all advertising counters for this date
    pub fn ad_total(&self) -> u64 {
        self.ad_metrics.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(date: &str, total: u64, backend: u64, client: u64) -> DailySnapshot {
        DailySnapshot {
            date: date.parse().unwrap(),
            timestamp: Utc::now(),
            total,
            backend,
            client,
            user_launch: 0,
            ad_metrics: BTreeMap::new(),
        }
    }

    #[test]
    fn test_merge_takes_field_wise_max() {
        let mut a = snapshot("2024-03-01", 50, 30, 7);
        a.user_launch = 5;
        a.ad_metrics.insert("ad banner".to_string(), 2);

        let mut b = snapshot("2024-03-01", 45, 40, 9);
        b.user_launch = 3;
        b.ad_metrics.insert("ad banner".to_string(), 6);

        a.merge_max(&b);

        assert_eq!(a.total, 50);
        assert_eq!(a.backend, 40);
        assert_eq!(a.client, 9);
        assert_eq!(a.user_launch, 5);
        assert_eq!(a.ad_metrics["ad banner"], 6);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut a = snapshot("2024-03-01", 50, 30, 7);
        let copy = a.clone();

        a.merge_max(&copy);

        assert_eq!(a, copy);
    }

    #[test]
    fn test_merge_keeps_ad_keys_from_both_sides() {
        let mut a = snapshot("2024-03-01", 1, 1, 1);
        a.ad_metrics.insert("ad banner".to_string(), 4);

        let mut b = snapshot("2024-03-01", 1, 1, 1);
        b.ad_metrics.insert("ad interstitial".to_string(), 9);

        a.merge_max(&b);

        assert_eq!(a.ad_metrics["ad banner"], 4);
        assert_eq!(a.ad_metrics["ad interstitial"], 9);
        assert_eq!(a.ad_total(), 13);
    }

    #[test]
    fn test_date_serializes_as_iso_string() {
        let snap = snapshot("2024-03-01", 10, 5, 5);
        let json = serde_json::to_value(&snap).unwrap();

        assert_eq!(json["date"], "2024-03-01");
    }
}
