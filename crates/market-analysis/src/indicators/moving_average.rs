//! Long-Horizon Moving Average
//!
//! Trailing mean over a fixed number of samples plus a scaled "top" band.
//! The window counts samples, not days: 730 samples only span two years when
//! the input is daily, and coarser or finer inputs shift that horizon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::PriceVolumeSeries;

/// ~2 years of daily samples
pub const DEFAULT_WINDOW: usize = 730;

/// Band multiplier applied to the average
pub const DEFAULT_MULTIPLIER: f64 = 5.0;

/// A raw sample extended with its trailing average columns
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
    pub ma_long: f64,
    pub ma_long_multiplier: f64,
}

/// Source series with `ma_long` and `ma_long_multiplier` aligned index-for-index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSeries {
    points: Vec<MovingAveragePoint>,
    window: usize,
}

impl MovingAverageSeries {
    pub fn points(&self) -> &[MovingAveragePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&MovingAveragePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub const fn window(&self) -> usize {
        self.window
    }
}

/// Computes the trailing mean and its multiplier band
#[derive(Clone, Copy, Debug)]
pub struct MovingAverage {
    window: usize,
    multiplier: f64,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MULTIPLIER)
    }
}

impl MovingAverage {
    /// A zero window is treated as 1
    pub fn new(window: usize, multiplier: f64) -> Self {
        Self {
            window: window.max(1),
            multiplier,
        }
    }

    pub const fn window(&self) -> usize {
        self.window
    }

    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Append `ma_long` / `ma_long_multiplier` to every sample.
    ///
    /// The window grows from one sample up to `window`, then slides. A NaN
    /// price makes the mean NaN for every window that contains it.
    pub fn apply(&self, series: &PriceVolumeSeries) -> MovingAverageSeries {
        let source = series.points();
        let mut points = Vec::with_capacity(source.len());

        let mut sum = 0.0;
        let mut nan_count = 0usize;

        for (i, point) in source.iter().enumerate() {
            if point.price.is_nan() {
                nan_count += 1;
            } else {
                sum += point.price;
            }

            if i >= self.window {
                let leaving = source[i - self.window].price;
                if leaving.is_nan() {
                    nan_count -= 1;
                } else {
                    sum -= leaving;
                }
            }

            let count = (i + 1).min(self.window);
            let ma_long = if nan_count > 0 { f64::NAN } else { sum / count as f64 };

            points.push(MovingAveragePoint {
                timestamp: point.timestamp,
                price: point.price,
                volume: point.volume,
                ma_long,
                ma_long_multiplier: ma_long * self.multiplier,
            });
        }

        tracing::debug!(
            samples = points.len(),
            window = self.window,
            last_ma = points.last().map(|p| p.ma_long),
            "computed long moving average"
        );

        MovingAverageSeries {
            points,
            window: self.window,
        }
    }
}
