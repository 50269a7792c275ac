//! Pivot Point & Resistance Levels
//!
//! Classic floor-trader pivots from the most recent daily bar.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::model::{DailyBar, DailyOhlcSeries};

/// Pivot point with first and second resistance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot_point: f64,
    pub r1: f64,
    pub r2: f64,
}

impl PivotLevels {
    /// Levels derived from a single bar
    pub fn from_bar(bar: &DailyBar) -> Self {
        let pivot_point = (bar.daily_max + bar.daily_min + bar.daily_close) / 3.0;
        Self {
            pivot_point,
            r1: 2.0 * pivot_point - bar.daily_min,
            r2: pivot_point + (bar.daily_max - bar.daily_min),
        }
    }

    /// Levels from the last bar of the series.
    ///
    /// Earlier bars are ignored. Whether that last bar is the intended
    /// "as of" day is the caller's concern.
    pub fn from_daily(series: &DailyOhlcSeries) -> Result<Self> {
        let bar = series
            .last()
            .ok_or(AnalysisError::EmptyInput("daily price series for pivot levels"))?;

        let levels = Self::from_bar(bar);
        tracing::debug!(
            date = %bar.date,
            pivot = levels.pivot_point,
            r1 = levels.r1,
            r2 = levels.r2,
            "computed pivot levels"
        );
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, max: f64, min: f64, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            daily_max: max,
            daily_min: min,
            daily_close: close,
        }
    }

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_classic_pivot_formula() {
        let series = DailyOhlcSeries::new(vec![bar(1, 70_000.0, 65_000.0, 68_000.0)]);
        let levels = PivotLevels::from_daily(&series).unwrap();

        assert!(close_to(levels.pivot_point, 67_666.667));
        assert!(close_to(levels.r1, 70_333.333));
        assert!(close_to(levels.r2, 72_666.667));
    }

    #[test]
    fn test_only_last_bar_counts() {
        let series = DailyOhlcSeries::new(vec![
            bar(1, 1.0, 1.0, 1.0),
            bar(2, 999.0, 1.0, 500.0),
            bar(3, 300.0, 240.0, 270.0),
        ]);
        let levels = PivotLevels::from_daily(&series).unwrap();
        assert_eq!(levels, PivotLevels::from_bar(&bar(3, 300.0, 240.0, 270.0)));
        assert!(close_to(levels.pivot_point, 270.0));
        assert!(close_to(levels.r1, 300.0));
        assert!(close_to(levels.r2, 330.0));
    }

    #[test]
    fn test_empty_series_fails() {
        let result = PivotLevels::from_daily(&DailyOhlcSeries::default());
        assert!(matches!(result, Err(AnalysisError::EmptyInput(_))));
    }
}
