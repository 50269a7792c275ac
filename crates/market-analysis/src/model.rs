//! Domain Models
//!
//! Time-series and snapshot types flowing through the indicator pipeline.
//! Prices and volumes are `f64`: the calculators follow rolling-statistics
//! semantics where a missing value propagates as NaN.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// A single `(timestamp, value)` observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimeSeriesSample {
    pub const fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One raw market observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

impl PricePoint {
    pub const fn new(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self { timestamp, price, volume }
    }
}

/// Raw price/volume samples, strictly increasing by timestamp
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceVolumeSeries {
    points: Vec<PricePoint>,
}

impl PriceVolumeSeries {
    /// Build a series, sorting by timestamp.
    ///
    /// Samples sharing a timestamp collapse into one; the one supplied last wins.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);

        let mut unique: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match unique.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => unique.push(point),
            }
        }

        Self { points: unique }
    }

    /// Join a price series and a volume series sample-by-sample.
    ///
    /// Market-chart APIs return the two arrays in lockstep; timestamps come
    /// from the price side.
    pub fn from_parallel(prices: &[TimeSeriesSample], volumes: &[TimeSeriesSample]) -> Result<Self> {
        if prices.len() != volumes.len() {
            return Err(AnalysisError::InvalidInput(format!(
                "{} price samples but {} volume samples",
                prices.len(),
                volumes.len()
            )));
        }

        let points = prices
            .iter()
            .zip(volumes)
            .map(|(p, v)| PricePoint::new(p.timestamp, p.value, v.value))
            .collect();

        Ok(Self::new(points))
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Samples with `from <= timestamp < to`
    pub fn within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.timestamp >= from && p.timestamp < to)
                .copied()
                .collect(),
        }
    }

    /// Price column as plain samples
    pub fn prices(&self) -> Vec<TimeSeriesSample> {
        self.points
            .iter()
            .map(|p| TimeSeriesSample::new(p.timestamp, p.price))
            .collect()
    }
}

/// One calendar day of resampled prices
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub daily_max: f64,
    pub daily_min: f64,
    pub daily_close: f64,
}

/// Daily buckets in ascending date order; days without samples are absent
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyOhlcSeries {
    bars: Vec<DailyBar>,
}

impl DailyOhlcSeries {
    pub fn new(mut bars: Vec<DailyBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }
}

/// A live price/volume observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price: f64,

    /// 24h traded volume in the quote currency
    pub volume: f64,
}

impl MarketSnapshot {
    pub const fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }
}

/// A Fear & Greed style sentiment reading (0 = extreme fear, 100 = extreme greed)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub date: NaiveDate,
    pub value: u8,
    pub classification: String,
}

impl SentimentReading {
    pub fn new(date: NaiveDate, value: u8) -> Self {
        Self {
            date,
            value,
            classification: classify_sentiment(value).to_string(),
        }
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = classification.into();
        self
    }
}

/// Label bands used by the alternative.me index
pub const fn classify_sentiment(value: u8) -> &'static str {
    match value {
        0..=24 => "Extreme Fear",
        25..=46 => "Fear",
        47..=54 => "Neutral",
        55..=75 => "Greed",
        _ => "Extreme Greed",
    }
}
