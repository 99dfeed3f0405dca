use analytics_fetcher::{AnalyticsFetcher, PollScheduler, Poller, PollerConfig};
use metrics_engine::{DailyAggregator, MetricsConfig, MetricsEngine};
use snapshot_store::{create_local_store, SnapshotBackend};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Surely Analytics Fetcher Service");

    // Load configuration
    let config = PollerConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    // Open the snapshot store
    let mut store = create_local_store(&config.data_dir)?;
    store.initialize().await?;
    let store: Arc<dyn SnapshotBackend> = Arc::new(store);

    // Wire up the aggregation pipeline
    let metrics_config = MetricsConfig::default();
    let fetcher = AnalyticsFetcher::new(config.api.clone())?;
    let aggregator = DailyAggregator::new(metrics_config.aggregation.clone(), store);
    let engine = MetricsEngine::new(metrics_config.query.clone());

    let poller = Arc::new(Poller::new(fetcher, aggregator, engine, metrics_config.aggregation));

    // Fetch immediately, then on the timer
    poller.poll().await;

    let mut scheduler = PollScheduler::new(
        Arc::clone(&poller),
        Duration::from_secs(config.scheduler.interval_secs),
    );
    scheduler.start();

    tokio::signal::ctrl_c().await?;

    scheduler.stop();
    info!("Shutting down");

    Ok(())
}
