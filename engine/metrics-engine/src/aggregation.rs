//! # Daily Aggregation
//!
//! Folds each poll's raw counters into the current date's stored snapshot.
//!
//! The upstream counters are assumed non-decreasing within a day, so repeated
//! or racing polls are absorbed with a field-wise monotonic-max merge: at most
//! one record exists per date and its numeric fields are the running maximum
//! observed that day.

use crate::config::AggregationConfig;
use crate::counters::RawCounters;
use chrono::{NaiveDate, Utc};
use snapshot_store::{DailySnapshot, Result, SnapshotBackend};
use std::sync::Arc;

/// Daily aggregator with exclusive write access to the snapshot store
pub struct DailyAggregator {
    config: AggregationConfig,
    store: Arc<dyn SnapshotBackend>,
}

impl DailyAggregator {
    /// Create a new aggregator over a store
    pub fn new(config: AggregationConfig, store: Arc<dyn SnapshotBackend>) -> Self {
        Self { config, store }
    }

    /// Get the store this aggregator writes to
    pub fn store(&self) -> &Arc<dyn SnapshotBackend> {
        &self.store
    }

    /// Apply one poll's counters to today's record (UTC calendar date)
    pub async fn apply(&self, counters: &RawCounters) -> Result<DailySnapshot> {
        self.apply_on(Utc::now().date_naive(), counters).await
    }

    /// Apply one poll's counters to a specific date's record
    pub async fn apply_on(
        &self,
        date: NaiveDate,
        counters: &RawCounters,
    ) -> Result<DailySnapshot> {
        let observed = self.snapshot_from(date, counters);

        let mut merged = match self.store.get(date).await? {
            Some(mut existing) => {
                existing.merge_max(&observed);
                existing
            }
            None => observed,
        };

        merged.timestamp = Utc::now();
        self.store.put(&merged).await?;

        tracing::debug!(
            "Applied counters for {}: total={} backend={} client={}",
            date,
            merged.total,
            merged.backend,
            merged.client
        );

        Ok(merged)
    }

    /// Project raw counters into a snapshot for a date
    fn snapshot_from(&self, date: NaiveDate, counters: &RawCounters) -> DailySnapshot {
        let mut snapshot = DailySnapshot::new(date, Utc::now());

        snapshot.total = counters.total_requests;
        snapshot.backend = counters.backend_total();
        snapshot.client = counters.client_total();
        snapshot.user_launch =
            counters.client.get(&self.config.launch_action).copied().unwrap_or(0);
        snapshot.ad_metrics = counters
            .client
            .iter()
            .filter(|(name, _)| self.config.is_ad_action(name))
            .map(|(name, &count)| (name.clone(), count))
            .collect();

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use snapshot_store::InMemorySnapshotStore;

    async fn aggregator() -> DailyAggregator {
        let mut store = InMemorySnapshotStore::with_default_config();
        store.initialize().await.unwrap();
        DailyAggregator::new(AggregationConfig::default(), Arc::new(store))
    }

    fn counters(value: serde_json::Value) -> RawCounters {
        RawCounters::from_value(value).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_first_poll_creates_record() {
        let agg = aggregator().await;
        let polled = counters(json!({
            "total_requests": 50,
            "backend": {"/a": 30},
            "client": {"user launch": 5, "ad banner": 2}
        }));

        let snapshot = agg.apply_on(date("2024-03-01"), &polled).await.unwrap();

        assert_eq!(snapshot.total, 50);
        assert_eq!(snapshot.backend, 30);
        assert_eq!(snapshot.client, 7);
        assert_eq!(snapshot.user_launch, 5);
        assert_eq!(snapshot.ad_metrics["ad banner"], 2);
    }

    #[tokio::test]
    async fn test_second_poll_merges_with_max() {
        let agg = aggregator().await;
        let day = date("2024-03-01");

        let first = counters(json!({
            "total_requests": 50,
            "backend": {"/a": 30},
            "client": {"user launch": 5, "ad banner": 2}
        }));
        let second = counters(json!({
            "total_requests": 45,
            "backend": {"/a": 40},
            "client": {"user launch": 3, "ad banner": 6}
        }));

        agg.apply_on(day, &first).await.unwrap();
        let merged = agg.apply_on(day, &second).await.unwrap();

        assert_eq!(merged.total, 50);
        assert_eq!(merged.backend, 40);
        assert_eq!(merged.client, 9);
        assert_eq!(merged.user_launch, 5);
        assert_eq!(merged.ad_metrics["ad banner"], 6);

        assert_eq!(agg.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeated_poll_is_idempotent() {
        let agg = aggregator().await;
        let day = date("2024-03-01");
        let polled = counters(json!({
            "total_requests": 50,
            "backend": {"/a": 30},
            "client": {"user launch": 5}
        }));

        let once = agg.apply_on(day, &polled).await.unwrap();
        let twice = agg.apply_on(day, &polled).await.unwrap();

        assert_eq!(once.total, twice.total);
        assert_eq!(once.backend, twice.backend);
        assert_eq!(once.client, twice.client);
        assert_eq!(once.user_launch, twice.user_launch);
        assert_eq!(once.ad_metrics, twice.ad_metrics);
    }

    #[tokio::test]
    async fn test_merge_is_monotonic_over_both_inputs() {
        let day = date("2024-03-01");
        let a = counters(json!({"backend": {"/a": 10, "/b": 3}, "client": {"x": 7}}));
        let b = counters(json!({"backend": {"/a": 4, "/b": 9}, "client": {"x": 2}}));

        let only_a = aggregator().await.apply_on(day, &a).await.unwrap();
        let only_b = aggregator().await.apply_on(day, &b).await.unwrap();

        let agg = aggregator().await;
        agg.apply_on(day, &a).await.unwrap();
        let both = agg.apply_on(day, &b).await.unwrap();

        assert!(both.backend >= only_a.backend && both.backend >= only_b.backend);
        assert!(both.client >= only_a.client && both.client >= only_b.client);
        assert!(both.total >= only_a.total && both.total >= only_b.total);
    }

    #[tokio::test]
    async fn test_distinct_dates_get_distinct_records() {
        let agg = aggregator().await;
        let polled = counters(json!({"backend": {"/a": 1}, "client": {}}));

        agg.apply_on(date("2024-03-01"), &polled).await.unwrap();
        agg.apply_on(date("2024-03-02"), &polled).await.unwrap();

        assert_eq!(agg.store().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_optional_counters_default_to_zero() {
        let agg = aggregator().await;
        let polled = counters(json!({"backend": {"/a": 12}}));

        let snapshot = agg.apply_on(date("2024-03-01"), &polled).await.unwrap();

        assert_eq!(snapshot.user_launch, 0);
        assert!(snapshot.ad_metrics.is_empty());
        assert_eq!(snapshot.client, 0);
    }

    #[tokio::test]
    async fn test_ad_extraction_honors_prefix_rule() {
        let agg = aggregator().await;
        let polled = counters(json!({
            "client": {"ad banner": 4, "adhoc sync": 11, "share": 3}
        }));

        let snapshot = agg.apply_on(date("2024-03-01"), &polled).await.unwrap();

        assert_eq!(snapshot.ad_metrics.len(), 1);
        assert_eq!(snapshot.ad_metrics["ad banner"], 4);
    }
}
