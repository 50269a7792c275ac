//! Snapshot Assembler
//!
//! Merges the latest indicator values with the live market snapshot and the
//! sentiment index into one flat, immutable record.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::indicators::moving_average::MovingAverageSeries;
use crate::indicators::pivot::PivotLevels;
use crate::indicators::volume::VolumeDeltas;
use crate::model::{MarketSnapshot, SentimentReading};

/// `(x - baseline) / baseline * 100`, refusing a zero baseline
pub fn pct_diff(x: f64, baseline: f64, baseline_name: &'static str) -> Result<f64> {
    if baseline == 0.0 {
        return Err(AnalysisError::DivisionByZero(baseline_name));
    }
    Ok((x - baseline) / baseline * 100.0)
}

/// Everything the narrative step gets to see
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub current_price: f64,
    pub current_volume: f64,
    pub volume_mean_last_30_days: f64,
    pub ma_2y: f64,
    pub ma_2y_multiplier: f64,
    pub diff_ma_2y: f64,
    pub diff_ma_2y_percent: f64,
    pub diff_ma_2y_multiplier: f64,
    pub diff_ma_2y_multiplier_percent: f64,
    pub diff_volume_last_30_days: f64,
    pub diff_volume_percent_last_30_days: f64,
    pub diff_volume_last_24_h: f64,
    pub diff_volume_percent_last_24_h: f64,
    pub fear_and_greed_index: u8,
    pub fear_and_greed_classification: String,
    pub pivot_point: f64,
    #[serde(rename = "R1")]
    pub r1: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

impl AnalysisResult {
    /// Assemble the record from upstream outputs.
    ///
    /// Fails with `EmptyInput` when the average series is empty and with
    /// `DivisionByZero` when any baseline is exactly zero.
    pub fn assemble(
        series: &MovingAverageSeries,
        snapshot: &MarketSnapshot,
        pivots: &PivotLevels,
        sentiment: &SentimentReading,
        volume_baseline_days: i64,
    ) -> Result<Self> {
        let latest = series
            .last()
            .ok_or(AnalysisError::EmptyInput("moving average series"))?;
        let ma = latest.ma_long;
        let ma_multiplier = latest.ma_long_multiplier;

        let volume = VolumeDeltas::compute(series, snapshot, volume_baseline_days)?;

        Ok(Self {
            current_price: snapshot.price,
            current_volume: snapshot.volume,
            volume_mean_last_30_days: volume.volume_mean,
            ma_2y: ma,
            ma_2y_multiplier: ma_multiplier,
            diff_ma_2y: snapshot.price - ma,
            diff_ma_2y_percent: pct_diff(snapshot.price, ma, "long moving average")?,
            diff_ma_2y_multiplier: snapshot.price - ma_multiplier,
            diff_ma_2y_multiplier_percent: pct_diff(
                snapshot.price,
                ma_multiplier,
                "long moving average multiplier",
            )?,
            diff_volume_last_30_days: volume.diff_vs_mean,
            diff_volume_percent_last_30_days: volume.diff_vs_mean_percent,
            diff_volume_last_24_h: volume.diff_vs_last,
            diff_volume_percent_last_24_h: volume.diff_vs_last_percent,
            fear_and_greed_index: sentiment.value,
            fear_and_greed_classification: sentiment.classification.clone(),
            pivot_point: pivots.pivot_point,
            r1: pivots.r1,
            r2: pivots.r2,
        })
    }
}
