//! Volume Deltas
//!
//! Compares the live 24h volume with a trailing N-day mean and with the most
//! recent series sample. The latter approximates a 24-hour change: it is the
//! last available bucket, not a true rolling 24-hour window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::indicators::moving_average::MovingAverageSeries;
use crate::model::MarketSnapshot;
use crate::snapshot::pct_diff;

/// Default baseline window in days
pub const DEFAULT_BASELINE_DAYS: i64 = 30;

/// Live volume measured against the trailing baseline and the last sample
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeDeltas {
    pub baseline_days: i64,
    pub volume_mean: f64,
    pub diff_vs_mean: f64,
    pub diff_vs_mean_percent: f64,
    pub last_volume: f64,
    pub diff_vs_last: f64,
    pub diff_vs_last_percent: f64,
}

/// Mean volume over `[last - days, last]`, both ends inclusive
pub fn trailing_volume_mean(series: &MovingAverageSeries, days: i64) -> Result<f64> {
    let mut samples: Vec<(DateTime<Utc>, f64)> = series
        .points()
        .iter()
        .map(|p| (p.timestamp, p.volume))
        .collect();
    samples.sort_by_key(|(ts, _)| *ts);

    let (last_ts, _) = *samples
        .last()
        .ok_or(AnalysisError::EmptyInput("price series for volume baseline"))?;
    let start = last_ts - Duration::days(days);

    let window: Vec<f64> = samples
        .iter()
        .filter(|(ts, _)| *ts >= start && *ts <= last_ts)
        .map(|(_, v)| *v)
        .collect();

    if window.is_empty() {
        return Err(AnalysisError::EmptyInput("volume baseline window"));
    }

    Ok(window.iter().sum::<f64>() / window.len() as f64)
}

impl VolumeDeltas {
    pub fn compute(
        series: &MovingAverageSeries,
        snapshot: &MarketSnapshot,
        baseline_days: i64,
    ) -> Result<Self> {
        let volume_mean = trailing_volume_mean(series, baseline_days)?;
        let last_volume = series
            .points()
            .iter()
            .max_by_key(|p| p.timestamp)
            .map(|p| p.volume)
            .ok_or(AnalysisError::EmptyInput("price series for volume baseline"))?;

        let deltas = Self {
            baseline_days,
            volume_mean,
            diff_vs_mean: snapshot.volume - volume_mean,
            diff_vs_mean_percent: pct_diff(snapshot.volume, volume_mean, "trailing volume mean")?,
            last_volume,
            diff_vs_last: snapshot.volume - last_volume,
            diff_vs_last_percent: pct_diff(snapshot.volume, last_volume, "last sample volume")?,
        };

        tracing::debug!(
            baseline_days,
            volume_mean,
            last_volume,
            live_volume = snapshot.volume,
            "computed volume deltas"
        );
        Ok(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::moving_average::MovingAverage;
    use crate::model::{PricePoint, PriceVolumeSeries};
    use chrono::TimeZone;

    fn daily_series(volumes: &[f64]) -> MovingAverageSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let raw = PriceVolumeSeries::new(
            volumes
                .iter()
                .enumerate()
                .map(|(i, &v)| PricePoint::new(start + Duration::days(i as i64), 100.0, v))
                .collect(),
        );
        MovingAverage::default().apply(&raw)
    }

    #[test]
    fn test_baseline_mean_and_percent() {
        let series = daily_series(&[10.0, 20.0, 30.0]);
        assert_eq!(trailing_volume_mean(&series, 30).unwrap(), 20.0);

        let deltas = VolumeDeltas::compute(&series, &MarketSnapshot::new(1.0, 25.0), 30).unwrap();
        assert_eq!(deltas.volume_mean, 20.0);
        assert_eq!(deltas.diff_vs_mean, 5.0);
        assert!((deltas.diff_vs_mean_percent - 25.0).abs() < 1e-9);
        assert_eq!(deltas.last_volume, 30.0);
        assert!((deltas.diff_vs_last_percent - (-100.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_inclusive_of_start() {
        // 40 daily samples: a 30-day window ending on the last one covers 31 samples
        let mut volumes = vec![1_000.0; 9];
        volumes.extend(vec![62.0; 31]);
        let series = daily_series(&volumes);
        assert_eq!(trailing_volume_mean(&series, 30).unwrap(), 62.0);
        assert_eq!(trailing_volume_mean(&series, 31).unwrap(), (1_000.0 + 62.0 * 31.0) / 32.0);
    }

    #[test]
    fn test_zero_baseline_is_an_error() {
        let series = daily_series(&[0.0, 0.0, 0.0]);
        let result = VolumeDeltas::compute(&series, &MarketSnapshot::new(1.0, 25.0), 30);
        assert!(matches!(result, Err(AnalysisError::DivisionByZero(_))));
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let series = MovingAverage::default().apply(&PriceVolumeSeries::default());
        let result = VolumeDeltas::compute(&series, &MarketSnapshot::new(1.0, 25.0), 30);
        assert!(matches!(result, Err(AnalysisError::EmptyInput(_))));
    }
}
