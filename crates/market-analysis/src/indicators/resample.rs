//! Daily Resampler
//!
//! Buckets raw price samples into calendar days of a fixed UTC offset.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::model::{DailyBar, DailyOhlcSeries, PriceVolumeSeries, TimeSeriesSample};

/// Groups samples into daily max/min/close bars
#[derive(Clone, Copy, Debug)]
pub struct DailyResampler {
    offset: FixedOffset,
}

impl Default for DailyResampler {
    fn default() -> Self {
        Self::utc()
    }
}

struct DayAccumulator {
    max: f64,
    min: f64,
    close: f64,
    close_at: DateTime<Utc>,
}

impl DailyResampler {
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day a timestamp falls on in this resampler's offset
    pub fn day_of(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.offset).date_naive()
    }

    /// Resample raw samples into one bar per day that has data.
    ///
    /// NaN prices count as missing and are skipped. The close is the price of
    /// the chronologically last sample of the day; on equal timestamps the one
    /// supplied later wins.
    pub fn resample(&self, samples: &[TimeSeriesSample]) -> DailyOhlcSeries {
        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

        for sample in samples.iter().filter(|s| !s.value.is_nan()) {
            days.entry(self.day_of(sample.timestamp))
                .and_modify(|day| {
                    day.max = day.max.max(sample.value);
                    day.min = day.min.min(sample.value);
                    if sample.timestamp >= day.close_at {
                        day.close = sample.value;
                        day.close_at = sample.timestamp;
                    }
                })
                .or_insert(DayAccumulator {
                    max: sample.value,
                    min: sample.value,
                    close: sample.value,
                    close_at: sample.timestamp,
                });
        }

        let bars = days
            .into_iter()
            .map(|(date, day)| DailyBar {
                date,
                daily_max: day.max,
                daily_min: day.min,
                daily_close: day.close,
            })
            .collect();

        tracing::debug!(samples = samples.len(), offset = %self.offset, "resampled to daily bars");
        DailyOhlcSeries::new(bars)
    }

    /// Resample the price column of a raw series
    pub fn resample_series(&self, series: &PriceVolumeSeries) -> DailyOhlcSeries {
        self.resample(&series.prices())
    }
}

/// One-shot form of [`DailyResampler::resample`]
pub fn resample_daily(samples: &[TimeSeriesSample], offset: FixedOffset) -> DailyOhlcSeries {
    DailyResampler::new(offset).resample(samples)
}
