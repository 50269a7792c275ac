//! # market-analysis
//!
//! Cryptocurrency market indicator pipeline with LLM-written commentary.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────┐   730 days   ┌──────────────────┐
//! │ MarketDataSource │─────────────▶│ MovingAverage    │──┐  ma_2y, ma_2y x5
//! │ (CoinGecko)      │              └──────────────────┘  │
//! │                  │    7 days    ┌──────────────────┐  │
//! │                  │─────────────▶│ DailyResampler   │  │
//! │                  │              │  -> PivotLevels  │──┤  pivot, R1, R2
//! │                  │   snapshot   └──────────────────┘  │
//! │                  │──────────────────────────────────▶ │  price, volume
//! └──────────────────┘                                    │
//! ┌──────────────────┐   latest                           ▼
//! │ SentimentSource  │───────────────────────────▶ ┌────────────────┐
//! │ (alternative.me) │                             │ AnalysisResult │
//! └──────────────────┘                             └───────┬────────┘
//!                                                          │ prompt::render
//!                                                          ▼
//!                                                  ┌────────────────┐
//!                                                  │ LlmProvider    │
//!                                                  │  -> commentary │
//!                                                  └────────────────┘
//! ```
//!
//! ## Reading the indicators
//!
//! - **Below the 2-year MA** - historically a zone of accumulation
//! - **Above the 2-year MA x5** - historically close to a cycle top
//! - **Pivot / R1 / R2** - short-term support and resistance from the last day

pub mod config;
pub mod error;
pub mod indicators;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod prompt;
pub mod snapshot;
pub mod source;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use model::{
    DailyBar, DailyOhlcSeries, MarketSnapshot, PricePoint, PriceVolumeSeries, SentimentReading,
    TimeSeriesSample,
};
pub use narrative::NarrativeGenerator;
pub use pipeline::{MarketReport, Pipeline};
pub use prompt::{PromptText, RenderOptions};
pub use snapshot::AnalysisResult;
pub use source::{
    AlternativeMeClient, CoinGeckoClient, MarketDataSource, MockMarketData, SentimentSource,
};

/// System prompt for the market commentary
pub const MARKET_ANALYST_PROMPT: &str = "You are a cryptocurrency market analyst. You write short, \
concise commentary (100 words at most) for the market section of a financial newspaper. Base every \
statement on the indicators you are given and end with a concrete recommendation.

Long-term guidance:
- Buying while the price is below the 2-year moving average has historically been favourable.
- A price above five times the 2-year moving average has historically signalled an overheated \
market where taking profit is worth considering.
- The market is volatile; remind readers to do their own research.";
