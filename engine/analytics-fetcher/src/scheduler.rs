//! Poll scheduling
//!
//! A single repeating timer drives automatic polls. A manual refresh polls
//! immediately and resets the timer phase, so the next automatic poll lands
//! exactly one interval later instead of on the stale phase. Stopping the
//! timer is synchronous and idempotent.

use crate::models::PollEvent;
use crate::poller::Poller;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::info;

/// Scheduler for the analytics poller
pub struct PollScheduler {
    poller: Arc<Poller>,
    interval: Duration,
    reset: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl PollScheduler {
    /// Create a new scheduler
    pub fn new(poller: Arc<Poller>, interval: Duration) -> Self {
        Self { poller, interval, reset: Arc::new(Notify::new()), task: None }
    }

    /// Start the repeating poll timer (no-op when already running)
    ///
    /// The first automatic poll fires one full interval after start; callers
    /// wanting data immediately run an initial poll themselves.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let poller = Arc::clone(&self.poller);
        let reset = Arc::clone(&self.reset);
        let period = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        poller.poll().await;
                    }
                    _ = reset.notified() => {
                        ticker = interval_at(Instant::now() + period, period);
                    }
                }
            }
        }));

        info!("Auto-refresh enabled (every {:?})", self.interval);
    }

    /// Stop the timer; calling with no timer active is a no-op
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Auto-refresh stopped");
        }
    }

    /// Whether the timer is currently running
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Poll immediately and restart the timer phase
    pub async fn refresh(&self) -> PollEvent {
        let event = self.poller.poll().await;
        self.reset.notify_one();
        event
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::fetcher::AnalyticsFetcher;
    use metrics_engine::{DailyAggregator, MetricsConfig, MetricsEngine};
    use snapshot_store::{InMemorySnapshotStore, SnapshotBackend};

    async fn scheduler() -> PollScheduler {
        let mut store = InMemorySnapshotStore::with_default_config();
        store.initialize().await.unwrap();
        let store: Arc<dyn SnapshotBackend> = Arc::new(store);

        let config = MetricsConfig::default();
        let fetcher = AnalyticsFetcher::new(ApiConfig {
            base_url: "http://127.0.0.1:9/analytics".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap();
        let aggregator = DailyAggregator::new(config.aggregation.clone(), store);
        let engine = MetricsEngine::new(config.query);
        let poller = Arc::new(Poller::new(fetcher, aggregator, engine, config.aggregation));

        PollScheduler::new(poller, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_noop() {
        let mut scheduler = scheduler().await;

        scheduler.stop();
        scheduler.stop();

        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_cancels() {
        let mut scheduler = scheduler().await;

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_manual_refresh_reports_the_poll_outcome() {
        let scheduler = scheduler().await;

        // The endpoint is unreachable, so the refresh surfaces a failure
        // event rather than touching the timer state.
        let event = scheduler.refresh().await;
        assert!(matches!(event, PollEvent::Failed { .. }));
    }
}
