//! Pipeline Configuration
//!
//! Everything a run needs, passed explicitly into the pipeline.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::{AnalysisError, Result};
use crate::indicators::{moving_average, volume};
use crate::source::{alternative_me, coingecko};

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Provider asset id (e.g., "bitcoin")
    pub asset_id: String,

    /// Display name used in the prompt (e.g., "Bitcoin")
    pub asset_name: String,

    /// Quote currency code (e.g., "usd")
    pub currency: String,

    /// Language the commentary is written in
    pub language: String,

    /// Completion model identifier
    pub model: String,

    /// Days of history behind the long moving average
    pub history_days: i64,

    /// Days of history resampled for pivot levels
    pub pivot_lookback_days: i64,

    /// Trailing window of the volume baseline
    pub volume_baseline_days: i64,

    pub ma_window: usize,
    pub ma_multiplier: f64,

    /// Sentiment readings to request; the latest is used
    pub sentiment_lookback: u32,

    /// Offset defining calendar-day boundaries
    pub utc_offset: FixedOffset,

    /// Bound on each market-data request
    pub http_timeout: Duration,

    /// Bound on the completion request
    pub llm_timeout: Duration,

    pub coingecko_url: String,
    pub fear_greed_url: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            asset_id: "bitcoin".into(),
            asset_name: "Bitcoin".into(),
            currency: "usd".into(),
            language: "english".into(),
            model: "gpt-4".into(),
            history_days: 730,
            pivot_lookback_days: 7,
            volume_baseline_days: volume::DEFAULT_BASELINE_DAYS,
            ma_window: moving_average::DEFAULT_WINDOW,
            ma_multiplier: moving_average::DEFAULT_MULTIPLIER,
            sentiment_lookback: 1,
            utc_offset: Utc.fix(),
            http_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(120),
            coingecko_url: coingecko::DEFAULT_BASE_URL.into(),
            fear_greed_url: alternative_me::DEFAULT_BASE_URL.into(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults overlaid with `MARKET_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(asset) = var("MARKET_ASSET") {
            config = config.with_asset(asset);
        }
        if let Some(name) = var("MARKET_ASSET_NAME") {
            config.asset_name = name;
        }
        if let Some(currency) = var("MARKET_CURRENCY") {
            config.currency = currency;
        }
        if let Some(language) = var("MARKET_LANGUAGE") {
            config.language = language;
        }
        if let Some(model) = var("MARKET_MODEL") {
            config.model = model;
        }
        if let Some(offset) = var("MARKET_UTC_OFFSET") {
            config.utc_offset = parse_utc_offset(&offset)?;
        }
        if let Some(secs) = var("MARKET_HTTP_TIMEOUT_SECS") {
            let secs = secs
                .parse()
                .map_err(|_| AnalysisError::Config(format!("MARKET_HTTP_TIMEOUT_SECS='{secs}'")))?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = var("MARKET_COINGECKO_URL") {
            config.coingecko_url = url;
        }
        if let Some(url) = var("MARKET_FEAR_GREED_URL") {
            config.fear_greed_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Switch asset, deriving a display name from the id
    pub fn with_asset(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = asset_id.into();
        self.asset_name = display_name(&self.asset_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(AnalysisError::Config("asset id is empty".into()));
        }
        if self.currency.trim().is_empty() {
            return Err(AnalysisError::Config("currency is empty".into()));
        }
        if self.history_days <= 0 || self.pivot_lookback_days <= 0 || self.volume_baseline_days <= 0 {
            return Err(AnalysisError::Config("look-back windows must be positive".into()));
        }
        if self.ma_window == 0 {
            return Err(AnalysisError::Config("moving average window must be at least 1".into()));
        }
        Ok(())
    }
}

/// "bitcoin-cash" -> "Bitcoin Cash"
fn display_name(asset_id: &str) -> String {
    asset_id
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts `UTC`, `Z`, `+HH:MM`, `-HH:MM` or `+HHMM`
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let invalid = || AnalysisError::Config(format!("invalid UTC offset '{raw}'"));

    let (sign, rest) = match raw.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.asset_id, "bitcoin");
        assert_eq!(config.history_days, 730);
        assert_eq!(config.pivot_lookback_days, 7);
        assert_eq!(config.volume_baseline_days, 30);
        assert_eq!(config.ma_window, 730);
        assert_eq!(config.ma_multiplier, 5.0);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("-0530").unwrap().local_minus_utc(), -19800);
        assert!(parse_utc_offset("02:00").is_err());
        assert!(parse_utc_offset("+2").is_err());
        assert!(parse_utc_offset("+01:75").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }

    #[test]
    fn test_with_asset_derives_display_name() {
        let config = AnalysisConfig::default().with_asset("bitcoin-cash");
        assert_eq!(config.asset_name, "Bitcoin Cash");
    }

    #[test]
    fn test_validate_rejects_bad_windows() {
        let config = AnalysisConfig {
            volume_baseline_days: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
    }
}
