use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the analytics fetcher service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Analytics endpoint configuration
    pub api: ApiConfig,

    /// Poll scheduling configuration
    pub scheduler: SchedulerConfig,

    /// Base directory for the snapshot store
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the analytics endpoint
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between automatic polls
    pub interval_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/analytics".to_string(),
                request_timeout_secs: 30,
            },
            scheduler: SchedulerConfig { interval_secs: 60 },
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl ApiConfig {
    /// URL of the all-time counters endpoint
    pub fn all_time_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// URL of the current-day counters endpoint
    pub fn today_url(&self) -> String {
        format!("{}/today", self.base_url.trim_end_matches('/'))
    }
}

impl PollerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("ANALYTICS_API_BASE") {
            config.api.base_url = base_url;
        }

        if let Ok(data_dir) = std::env::var("ANALYTICS_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(secs) = std::env::var("ANALYTICS_POLL_SECS") {
            config.scheduler.interval_secs = secs.parse().unwrap_or(60);
        }

        if let Ok(secs) = std::env::var("ANALYTICS_TIMEOUT_SECS") {
            config.api.request_timeout_secs = secs.parse().unwrap_or(30);
        }

        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PollerConfig = toml::from_str(&content)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.is_empty() {
            return Err("api.base_url must not be empty".to_string());
        }

        if self.scheduler.interval_secs == 0 {
            return Err("scheduler.interval_secs must be greater than 0".to_string());
        }

        if self.api.request_timeout_secs == 0 {
            return Err("api.request_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
