//! Poll orchestration
//!
//! One poll cycle fetches the all-time and current-day counter payloads,
//! folds the current-day payload into the snapshot store, records a session
//! point, and publishes a freshly derived dashboard summary. Cycles are
//! serialized with an in-flight guard: an overlapping invocation is rejected
//! instead of racing the store's read-modify-write.

use crate::error::PollError;
use crate::fetcher::AnalyticsFetcher;
use crate::models::{PollEvent, PollerStatus};
use chrono::Utc;
use metrics_engine::{
    AggregationConfig, DailyAggregator, DashboardSummary, MetricsEngine, SessionBuffer,
    SessionPoint,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

/// Orchestrates fetch → aggregate → derive cycles
pub struct Poller {
    fetcher: AnalyticsFetcher,
    aggregator: DailyAggregator,
    engine: MetricsEngine,
    rules: AggregationConfig,
    session: Mutex<SessionBuffer>,
    in_flight: AtomicBool,
    status: watch::Sender<PollerStatus>,
    summary: watch::Sender<Option<DashboardSummary>>,
}

impl Poller {
    /// Create a new poller
    pub fn new(
        fetcher: AnalyticsFetcher,
        aggregator: DailyAggregator,
        engine: MetricsEngine,
        rules: AggregationConfig,
    ) -> Self {
        let (status, _) = watch::channel(PollerStatus::Offline);
        let (summary, _) = watch::channel(None);

        Self {
            fetcher,
            aggregator,
            engine,
            rules,
            session: Mutex::new(SessionBuffer::new()),
            in_flight: AtomicBool::new(false),
            status,
            summary,
        }
    }

    /// Subscribe to derived summaries (the "metrics changed" signal)
    pub fn summaries(&self) -> watch::Receiver<Option<DashboardSummary>> {
        self.summary.subscribe()
    }

    /// Subscribe to connectivity status
    pub fn status(&self) -> watch::Receiver<PollerStatus> {
        self.status.subscribe()
    }

    /// Session points observed at or after `cutoff`, for short-window views
    pub async fn session_since(&self, cutoff: chrono::DateTime<Utc>) -> Vec<SessionPoint> {
        self.session.lock().await.since(cutoff)
    }

    /// Run one poll cycle
    ///
    /// Errors never escape: they are converted to a [`PollEvent::Failed`]
    /// and the previously published summary stays in place.
    pub async fn poll(&self) -> PollEvent {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Poll already in flight; skipping");
            return PollEvent::Skipped { timestamp: Utc::now() };
        }

        let event = match self.poll_cycle().await {
            Ok(event) => {
                self.status.send_replace(PollerStatus::Online);
                event
            }
            Err(e) => {
                error!("Poll failed: {}", e);
                self.status.send_replace(PollerStatus::Offline);
                PollEvent::Failed {
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                }
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);

        event
    }

    async fn poll_cycle(&self) -> Result<PollEvent, PollError> {
        let all_time = self.fetcher.fetch_all_time().await?;
        let today_counters = self.fetcher.fetch_today().await?;

        let snapshot = self.aggregator.apply(&today_counters).await?;

        let now = Utc::now();
        {
            let mut session = self.session.lock().await;
            session.push(SessionPoint::observe(now, &today_counters));
        }

        let snapshots = self.aggregator.store().get_all().await?;
        let summary =
            self.engine.summary(&all_time, &today_counters, &snapshots, &self.rules, now);
        self.summary.send_replace(Some(summary));

        info!("Applied counters for {}: total={}", snapshot.date, snapshot.total);

        Ok(PollEvent::Applied { date: snapshot.date, total: snapshot.total, timestamp: now })
    }
}
