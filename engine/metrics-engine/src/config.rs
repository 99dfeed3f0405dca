//! # Configuration Management
//!
//! Configuration structures and management for the metrics engine.

use serde::{Deserialize, Serialize};

/// Main configuration for the metrics engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    /// Aggregation configuration
    pub aggregation: AggregationConfig,
    /// Query configuration
    pub query: QueryConfig,
}

/// Aggregation configuration
///
/// Carries the single normalization rule for semantically tagged client
/// actions. Earlier dashboard builds disagreed on whether the advertising
/// marker included the trailing space; this is the one place the rule lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Exact client action name counted as an app launch
    pub launch_action: String,
    /// Prefix marking advertising-related client actions
    pub ad_prefix: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { launch_action: "user launch".to_string(), ad_prefix: "ad ".to_string() }
    }
}

impl AggregationConfig {
    /// Whether an action name is advertising-related
    pub fn is_ad_action(&self, name: &str) -> bool {
        name.starts_with(&self.ad_prefix)
    }

    /// Whether an action name is the app-launch counter
    pub fn is_launch_action(&self, name: &str) -> bool {
        name == self.launch_action
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Rolling week window length (days)
    pub week_window_days: u32,
    /// Rolling month window length (days)
    pub month_window_days: u32,
    /// Number of trailing dates examined for trend classification
    pub trend_days: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { week_window_days: 7, month_window_days: 30, trend_days: 7 }
    }
}

impl MetricsConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &str) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: MetricsConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &str) -> Result<(), anyhow::Error> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
