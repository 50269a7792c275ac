//! Technical Indicators
//!
//! Pure calculations over already-fetched series: daily resampling, pivot
//! levels, the long moving average and volume deltas.

pub mod moving_average;
pub mod pivot;
pub mod resample;
pub mod volume;

pub use moving_average::{MovingAverage, MovingAveragePoint, MovingAverageSeries};
pub use pivot::PivotLevels;
pub use resample::{DailyResampler, resample_daily};
pub use volume::{VolumeDeltas, trailing_volume_mean};
