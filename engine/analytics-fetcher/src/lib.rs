//! # Analytics Fetcher
//!
//! Polls the remote analytics endpoint on a fixed interval and feeds each
//! raw counters payload through the daily aggregation pipeline.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod poller;
pub mod scheduler;

pub use config::{ApiConfig, PollerConfig, SchedulerConfig};
pub use error::{PollError, Result};
pub use fetcher::AnalyticsFetcher;
pub use models::{PollEvent, PollerStatus};
pub use poller::Poller;
pub use scheduler::PollScheduler;
