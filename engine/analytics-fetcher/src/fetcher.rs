use crate::config::ApiConfig;
use crate::error::{PollError, Result};
use metrics_engine::{ParseError, RawCounters};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration as StdDuration;
use tracing::debug;

/// HTTP fetcher for the analytics endpoint
pub struct AnalyticsFetcher {
    config: ApiConfig,
    client: Client,
}

impl AnalyticsFetcher {
    /// Create a new fetcher instance
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Fetch the all-time cumulative counters
    pub async fn fetch_all_time(&self) -> Result<RawCounters> {
        self.fetch(&self.config.all_time_url()).await
    }

    /// Fetch the current-day counters
    pub async fn fetch_today(&self) -> Result<RawCounters> {
        self.fetch(&self.config.today_url()).await
    }

    async fn fetch(&self, url: &str) -> Result<RawCounters> {
        debug!("Fetching counters from: {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PollError::network(format!("HTTP {} from {url}", response.status())));
        }

        // Decode in two steps so a malformed body classifies as a parse
        // failure rather than a transport failure.
        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(ParseError::from)?;

        Ok(RawCounters::from_value(value)?)
    }
}
