//! # MetricsEngine
//!
//! Daily aggregation and historical metrics for the Surely analytics
//! dashboard.
//!
//! Each poll of the analytics endpoint yields a [`RawCounters`] payload. The
//! [`DailyAggregator`] folds it into the current date's stored record with a
//! monotonic-max merge, and the [`MetricsEngine`] derives the dashboard's
//! summary statistics (growth badges, rolling windows, peaks, top-N
//! rankings, trends) from the stored history without ever mutating it.

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod counters;
pub mod export;
pub mod query;
pub mod session;

// Re-export main types for easy usage
pub use aggregation::DailyAggregator;
pub use config::{AggregationConfig, MetricsConfig, QueryConfig};
pub use counters::{ParseError, RawCounters};
pub use export::{export_file_name, ExportDocument};
pub use query::{
    DashboardSummary, DateRange, GrowthBadge, Metric, MetricBlock, MetricsEngine, PeakDay, Trend,
    WindowAggregate,
};
pub use session::{SessionBuffer, SessionPoint, DEFAULT_SESSION_CAPACITY};
