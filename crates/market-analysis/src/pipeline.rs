//! Analysis Pipeline
//!
//! Runs the stages in dependency order for one injected reference time:
//!
//! 1. two years of history -> long moving average
//! 2. one week of history -> daily buckets -> pivot levels
//! 3. live snapshot and latest sentiment reading
//! 4. assemble [`AnalysisResult`], optionally ask for commentary
//!
//! Every stage is awaited sequentially and the first error aborts the run.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::indicators::{DailyResampler, MovingAverage, PivotLevels};
use crate::narrative::NarrativeGenerator;
use crate::prompt::{self, RenderOptions};
use crate::snapshot::AnalysisResult;
use crate::source::{AlternativeMeClient, CoinGeckoClient, MarketDataSource, SentimentSource};

/// A finished run: indicators plus the generated commentary
#[derive(Clone, Debug, Serialize)]
pub struct MarketReport {
    pub run_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub asset_id: String,
    pub currency: String,
    pub analysis: AnalysisResult,
    pub commentary: String,
}

pub struct Pipeline {
    config: AnalysisConfig,
    market: Arc<dyn MarketDataSource>,
    sentiment: Arc<dyn SentimentSource>,
}

impl Pipeline {
    pub fn new(
        config: AnalysisConfig,
        market: Arc<dyn MarketDataSource>,
        sentiment: Arc<dyn SentimentSource>,
    ) -> Self {
        Self {
            config,
            market,
            sentiment,
        }
    }

    /// Pipeline over the live CoinGecko and alternative.me APIs
    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let market = CoinGeckoClient::with_base_url(&config.coingecko_url, config.http_timeout)?;
        let sentiment =
            AlternativeMeClient::with_base_url(&config.fear_greed_url, config.http_timeout)?;
        Ok(Self::new(config, Arc::new(market), Arc::new(sentiment)))
    }

    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            asset_name: self.config.asset_name.clone(),
            currency: self.config.currency.clone(),
            language: self.config.language.clone(),
        }
    }

    /// Start of the calendar day containing `as_of`, in the configured offset
    pub fn window_end(&self, as_of: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let offset = self.config.utc_offset;
        let day = as_of.with_timezone(&offset).date_naive();
        offset
            .from_local_datetime(&day.and_time(NaiveTime::MIN))
            .single()
            .map(|start| start.with_timezone(&Utc))
            .ok_or_else(|| AnalysisError::InvalidInput(format!("no day boundary for {as_of}")))
    }

    /// Compute indicators only
    pub async fn analyze(&self, as_of: DateTime<Utc>) -> Result<AnalysisResult> {
        let span = self.run_span(Uuid::new_v4());
        self.compute(as_of).instrument(span).await
    }

    /// Compute indicators and ask `generator` for commentary on them
    pub async fn run(
        &self,
        as_of: DateTime<Utc>,
        generator: &NarrativeGenerator,
    ) -> Result<MarketReport> {
        let run_id = Uuid::new_v4();
        let span = self.run_span(run_id);

        async {
            let analysis = self.compute(as_of).await?;

            let prompt = prompt::render(&analysis, &self.render_options());
            let commentary = generator.generate(&prompt).await?;
            tracing::info!(chars = commentary.len(), "commentary received");

            Ok::<_, AnalysisError>(MarketReport {
                run_id,
                as_of,
                asset_id: self.config.asset_id.clone(),
                currency: self.config.currency.clone(),
                analysis,
                commentary,
            })
        }
        .instrument(span)
        .await
    }

    fn run_span(&self, run_id: Uuid) -> tracing::Span {
        tracing::info_span!(
            "market_run",
            run_id = %run_id,
            asset = %self.config.asset_id,
            currency = %self.config.currency,
        )
    }

    async fn compute(&self, as_of: DateTime<Utc>) -> Result<AnalysisResult> {
        let config = &self.config;
        let to = self.window_end(as_of)?;

        tracing::info!(
            market = self.market.name(),
            sentiment = self.sentiment.name(),
            window_end = %to,
            "starting analysis"
        );

        let history = self
            .market
            .market_chart_range(
                &config.asset_id,
                &config.currency,
                to - Duration::days(config.history_days),
                to,
            )
            .await?;
        let averaged = MovingAverage::new(config.ma_window, config.ma_multiplier).apply(&history);
        tracing::info!(
            samples = averaged.len(),
            ma_long = averaged.last().map(|p| p.ma_long),
            "long moving average computed"
        );

        let recent = self
            .market
            .market_chart_range(
                &config.asset_id,
                &config.currency,
                to - Duration::days(config.pivot_lookback_days),
                to,
            )
            .await?;
        let daily = DailyResampler::new(config.utc_offset).resample_series(&recent);
        let pivots = PivotLevels::from_daily(&daily)?;
        tracing::info!(
            days = daily.len(),
            pivot = pivots.pivot_point,
            r1 = pivots.r1,
            r2 = pivots.r2,
            "pivot levels computed"
        );

        let snapshot = self
            .market
            .current_snapshot(&config.asset_id, &config.currency)
            .await?;

        let sentiment = self
            .sentiment
            .fear_and_greed(config.sentiment_lookback)
            .await?
            .pop()
            .ok_or(AnalysisError::EmptyInput("sentiment index series"))?;

        let result = AnalysisResult::assemble(
            &averaged,
            &snapshot,
            &pivots,
            &sentiment,
            config.volume_baseline_days,
        )?;
        tracing::info!(
            price = result.current_price,
            diff_ma_2y_percent = result.diff_ma_2y_percent,
            fear_and_greed = result.fear_and_greed_index,
            "analysis assembled"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_utc_offset;
    use crate::model::{MarketSnapshot, PriceVolumeSeries, SentimentReading};
    use crate::source::MockMarketData;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 1, 0, 0).unwrap()
    }

    fn mock_pipeline(config: AnalysisConfig, mock: MockMarketData) -> Pipeline {
        let mock = Arc::new(mock);
        Pipeline::new(config, mock.clone(), mock)
    }

    /// Records every requested window, then delegates to the mock
    struct Recording {
        inner: MockMarketData,
        windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl MarketDataSource for Recording {
        async fn market_chart_range(
            &self,
            asset_id: &str,
            currency: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<PriceVolumeSeries> {
            self.windows.lock().unwrap().push((from, to));
            self.inner.market_chart_range(asset_id, currency, from, to).await
        }

        async fn current_snapshot(&self, asset_id: &str, currency: &str) -> Result<MarketSnapshot> {
            self.inner.current_snapshot(asset_id, currency).await
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct NoSentiment;

    #[async_trait]
    impl SentimentSource for NoSentiment {
        async fn fear_and_greed(&self, _limit: u32) -> Result<Vec<SentimentReading>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    #[test]
    fn test_window_end_is_local_midnight() {
        let utc = mock_pipeline(AnalysisConfig::default(), MockMarketData::new(as_of()));
        assert_eq!(
            utc.window_end(as_of()).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
        );

        let config = AnalysisConfig {
            utc_offset: parse_utc_offset("+02:00").unwrap(),
            ..Default::default()
        };
        let plus_two = mock_pipeline(config, MockMarketData::new(as_of()));
        assert_eq!(
            plus_two.window_end(as_of()).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 9, 22, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_fetch_windows() {
        let market = Arc::new(Recording {
            inner: MockMarketData::new(as_of()),
            windows: Mutex::new(Vec::new()),
        });
        let sentiment = Arc::new(MockMarketData::new(as_of()));
        let pipeline = Pipeline::new(AnalysisConfig::default(), market.clone(), sentiment);

        pipeline.analyze(as_of()).await.unwrap();

        let end = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let windows = market.windows.lock().unwrap();
        assert_eq!(
            *windows,
            vec![
                (end - Duration::days(730), end),
                (end - Duration::days(7), end),
            ]
        );
    }

    #[tokio::test]
    async fn test_flat_market_analysis() {
        let mock = MockMarketData::new(as_of())
            .flat()
            .with_snapshot(MarketSnapshot::new(107_250.0, 25_000_000_000.0))
            .with_sentiment(72);
        let pipeline = mock_pipeline(AnalysisConfig::default(), mock);

        let result = pipeline.analyze(as_of()).await.unwrap();

        assert_eq!(result.ma_2y, 97_500.0);
        assert_eq!(result.ma_2y_multiplier, 487_500.0);
        assert!((result.diff_ma_2y_percent - 10.0).abs() < 1e-9);
        assert!((result.diff_ma_2y - 9_750.0).abs() < 1e-9);
        assert_eq!(result.pivot_point, 97_500.0);
        assert_eq!(result.r1, 97_500.0);
        assert_eq!(result.r2, 97_500.0);
        assert_eq!(result.fear_and_greed_index, 72);
        assert_eq!(result.fear_and_greed_classification, "Greed");
    }

    #[tokio::test]
    async fn test_missing_sentiment_aborts_run() {
        let pipeline = Pipeline::new(
            AnalysisConfig::default(),
            Arc::new(MockMarketData::new(as_of())),
            Arc::new(NoSentiment),
        );

        let err = pipeline.analyze(as_of()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_asset_aborts_run() {
        let config = AnalysisConfig::default().with_asset("notacoin");
        let pipeline = mock_pipeline(config, MockMarketData::new(as_of()));

        let err = pipeline.analyze(as_of()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_render_options_follow_config() {
        let config = AnalysisConfig {
            language: "german".into(),
            currency: "eur".into(),
            ..AnalysisConfig::default().with_asset("ethereum")
        };
        let pipeline = mock_pipeline(config, MockMarketData::new(as_of()));
        let options = pipeline.render_options();
        assert_eq!(options.asset_name, "Ethereum");
        assert_eq!(options.currency, "eur");
        assert_eq!(options.language, "german");
    }
}
