//! Mock Market Data
//!
//! For offline runs and tests. Produces deterministic synthetic charts with
//! the same density rules the live chart API applies.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{MarketDataSource, SentimentSource};
use crate::error::{AnalysisError, Result};
use crate::model::{MarketSnapshot, PricePoint, PriceVolumeSeries, SentimentReading};

/// Mock source with static base prices and a gentle deterministic wave
pub struct MockMarketData {
    /// Reference "today" for sentiment readings
    as_of: DateTime<Utc>,

    /// Amplitude of the price wave, as a fraction of the base price
    wave: f64,

    /// Replaces the derived snapshot when set
    snapshot: Option<MarketSnapshot>,

    sentiment: u8,
}

impl MockMarketData {
    pub const fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            wave: 0.05,
            snapshot: None,
            sentiment: 52,
        }
    }

    /// Flat charts (every sample at the base price)
    pub const fn flat(mut self) -> Self {
        self.wave = 0.0;
        self
    }

    pub const fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub const fn with_sentiment(mut self, value: u8) -> Self {
        self.sentiment = value;
        self
    }

    /// Base (price, 24h volume) per asset id
    fn base(asset_id: &str) -> Result<(f64, f64)> {
        match asset_id.to_lowercase().as_str() {
            "bitcoin" => Ok((97_500.0, 25_000_000_000.0)),
            "ethereum" => Ok((3_450.0, 15_000_000_000.0)),
            "solana" => Ok((195.0, 3_000_000_000.0)),
            "cardano" => Ok((0.95, 500_000_000.0)),
            _ => Err(AnalysisError::InvalidInput(format!("unsupported asset '{asset_id}'"))),
        }
    }

    /// Sample spacing by window length: 5 minutes up to a day, hourly up to
    /// 90 days, daily beyond
    fn granularity(span: Duration) -> Duration {
        if span <= Duration::days(1) {
            Duration::minutes(5)
        } else if span <= Duration::days(90) {
            Duration::hours(1)
        } else {
            Duration::days(1)
        }
    }
}

#[async_trait]
impl MarketDataSource for MockMarketData {
    async fn market_chart_range(
        &self,
        asset_id: &str,
        _currency: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PriceVolumeSeries> {
        let (base_price, base_volume) = Self::base(asset_id)?;
        if from >= to {
            return Err(AnalysisError::InvalidInput(format!(
                "empty time window {from} .. {to}"
            )));
        }

        let step = Self::granularity(to - from);
        let mut points = Vec::new();
        let mut ts = from;
        let mut i = 0u32;

        while ts < to {
            let phase = f64::from(i);
            let price = base_price * self.wave.mul_add((phase / 10.0).sin(), 1.0);
            let volume = base_volume * 0.2f64.mul_add((phase / 7.0).cos(), 1.0);
            points.push(PricePoint::new(ts, price, volume));
            ts += step;
            i += 1;
        }

        Ok(PriceVolumeSeries::new(points))
    }

    async fn current_snapshot(&self, asset_id: &str, _currency: &str) -> Result<MarketSnapshot> {
        let (base_price, base_volume) = Self::base(asset_id)?;
        Ok(self
            .snapshot
            .unwrap_or_else(|| MarketSnapshot::new(base_price, base_volume)))
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

#[async_trait]
impl SentimentSource for MockMarketData {
    async fn fear_and_greed(&self, limit: u32) -> Result<Vec<SentimentReading>> {
        let today = self.as_of.date_naive();
        Ok((0..i64::from(limit.max(1)))
            .rev()
            .map(|days_ago| SentimentReading::new(today - Duration::days(days_ago), self.sentiment))
            .collect())
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_granularity_follows_window() {
        let mock = MockMarketData::new(as_of());

        let week = mock
            .market_chart_range("bitcoin", "usd", as_of() - Duration::days(7), as_of())
            .await
            .unwrap();
        assert_eq!(week.len(), 7 * 24);

        let two_years = mock
            .market_chart_range("bitcoin", "usd", as_of() - Duration::days(730), as_of())
            .await
            .unwrap();
        assert_eq!(two_years.len(), 730);
        assert!(two_years.last().unwrap().timestamp < as_of());
    }

    #[tokio::test]
    async fn test_flat_chart() {
        let mock = MockMarketData::new(as_of()).flat();
        let series = mock
            .market_chart_range("ethereum", "usd", as_of() - Duration::days(3), as_of())
            .await
            .unwrap();
        assert!(series.points().iter().all(|p| p.price == 3_450.0));
    }

    #[tokio::test]
    async fn test_unsupported_asset() {
        let mock = MockMarketData::new(as_of());
        let result = mock.current_snapshot("notreal", "usd").await;
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_sentiment_readings() {
        let mock = MockMarketData::new(as_of()).with_sentiment(45);
        let readings = mock.fear_and_greed(3).await.unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[2].date, as_of().date_naive());
        assert!(readings[0].date < readings[2].date);

        let latest = mock.latest_sentiment().await.unwrap();
        assert_eq!(latest.value, 45);
        assert_eq!(latest.classification, "Fear");
    }
}
