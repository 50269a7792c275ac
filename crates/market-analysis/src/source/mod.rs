//! Market Data Sources
//!
//! Abstractions and implementations for the external time-series providers.
//! Every call is a single attempt bounded by the client timeout; failures
//! surface as `RemoteFetch` and retry policy stays with the caller.

pub mod alternative_me;
pub mod coingecko;
mod mock;

pub use alternative_me::AlternativeMeClient;
pub use coingecko::CoinGeckoClient;
pub use mock::MockMarketData;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::{AnalysisError, Result};
use crate::model::{MarketSnapshot, PriceVolumeSeries, SentimentReading};

/// Price/volume provider (Strategy pattern)
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Samples covering `[from, to)` at provider-chosen granularity
    async fn market_chart_range(
        &self,
        asset_id: &str,
        currency: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PriceVolumeSeries>;

    /// Current price and 24h volume
    async fn current_snapshot(&self, asset_id: &str, currency: &str) -> Result<MarketSnapshot>;

    /// Source name
    fn name(&self) -> &str;
}

/// Sentiment index provider
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// The last `limit` daily readings, oldest first
    async fn fear_and_greed(&self, limit: u32) -> Result<Vec<SentimentReading>>;

    /// Most recent reading
    async fn latest_sentiment(&self) -> Result<SentimentReading> {
        self.fear_and_greed(1)
            .await?
            .pop()
            .ok_or(AnalysisError::EmptyInput("sentiment index series"))
    }

    /// Source name
    fn name(&self) -> &str;
}

/// Build a client whose every request is bounded by `timeout`
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("market-insight/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AnalysisError::Config(format!("HTTP client: {e}")))
}

/// GET a JSON document, mapping transport and status failures to `RemoteFetch`
/// and undecodable bodies to `MalformedResponse`
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    source_name: &'static str,
) -> Result<T> {
    tracing::debug!(source = source_name, url, "fetching");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AnalysisError::RemoteFetch(format!("{source_name}: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AnalysisError::RemoteFetch(format!("{source_name}: {e}")))?;

    if !status.is_success() {
        let detail: String = body.chars().take(200).collect();
        return Err(AnalysisError::RemoteFetch(format!(
            "{source_name} returned {status}: {}",
            detail.trim()
        )));
    }

    serde_json::from_str(&body).map_err(|e| AnalysisError::MalformedResponse {
        source_name,
        detail: e.to_string(),
    })
}
