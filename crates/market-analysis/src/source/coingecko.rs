//! CoinGecko Client
//!
//! Historical market charts and live market snapshots from the public API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{MarketDataSource, get_json, http_client};
use crate::error::{AnalysisError, Result};
use crate::model::{MarketSnapshot, PriceVolumeSeries, TimeSeriesSample};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const SOURCE: &str = "CoinGecko";

/// `/coins/{id}/market_chart/range` payload: `[millis, value]` pairs
#[derive(Debug, Deserialize)]
struct MarketChartRange {
    prices: Vec<[f64; 2]>,
    total_volumes: Vec<[f64; 2]>,
}

/// One row of `/coins/markets`
#[derive(Debug, Deserialize)]
struct CoinMarket {
    current_price: Option<f64>,
    total_volume: Option<f64>,
}

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn samples(pairs: &[[f64; 2]], column: &str) -> Result<Vec<TimeSeriesSample>> {
        pairs
            .iter()
            .map(|[millis, value]| {
                DateTime::from_timestamp_millis(*millis as i64)
                    .filter(|_| millis.is_finite())
                    .map(|ts| TimeSeriesSample::new(ts, *value))
                    .ok_or_else(|| AnalysisError::MalformedResponse {
                        source_name: SOURCE,
                        detail: format!("bad {column} timestamp {millis}"),
                    })
            })
            .collect()
    }

    fn to_series(chart: &MarketChartRange) -> Result<PriceVolumeSeries> {
        let prices = Self::samples(&chart.prices, "price")?;
        let volumes = Self::samples(&chart.total_volumes, "volume")?;

        PriceVolumeSeries::from_parallel(&prices, &volumes).map_err(|e| {
            AnalysisError::MalformedResponse {
                source_name: SOURCE,
                detail: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn market_chart_range(
        &self,
        asset_id: &str,
        currency: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PriceVolumeSeries> {
        if from >= to {
            return Err(AnalysisError::InvalidInput(format!(
                "empty time window {from} .. {to}"
            )));
        }

        let url = format!("{}/coins/{asset_id}/market_chart/range", self.base_url);
        let query = [
            ("vs_currency", currency.to_lowercase()),
            ("from", from.timestamp().to_string()),
            ("to", to.timestamp().to_string()),
        ];

        let chart: MarketChartRange = get_json(&self.client, &url, &query, SOURCE).await?;
        let raw = Self::to_series(&chart)?;

        // The range endpoint is inclusive of `to`; daily points sit on 00:00 UTC
        let series = raw.within(from, to);
        if series.len() < raw.len() {
            tracing::debug!(dropped = raw.len() - series.len(), "discarded samples outside window");
        }

        tracing::info!(
            asset = asset_id,
            samples = series.len(),
            from = %from,
            to = %to,
            "fetched market chart"
        );
        Ok(series)
    }

    async fn current_snapshot(&self, asset_id: &str, currency: &str) -> Result<MarketSnapshot> {
        let url = format!("{}/coins/markets", self.base_url);
        let query = [
            ("vs_currency", currency.to_lowercase()),
            ("ids", asset_id.to_string()),
        ];

        let markets: Vec<CoinMarket> = get_json(&self.client, &url, &query, SOURCE).await?;
        let market = markets.last().ok_or_else(|| AnalysisError::MalformedResponse {
            source_name: SOURCE,
            detail: format!("no market data for '{asset_id}'"),
        })?;

        match (market.current_price, market.total_volume) {
            (Some(price), Some(volume)) => {
                tracing::info!(asset = asset_id, price, volume, "fetched market snapshot");
                Ok(MarketSnapshot::new(price, volume))
            }
            _ => Err(AnalysisError::MalformedResponse {
                source_name: SOURCE,
                detail: format!("'{asset_id}' is missing price or volume"),
            }),
        }
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
