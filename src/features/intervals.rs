//! Interval summary features for fixed-length series.
//!
//! Each interval contributes three columns to the feature matrix, in order:
//! mean, population standard deviation and least-squares slope.

use rand::Rng;

use crate::error::{Result, TsmlError};
use crate::utils::stats::{mean, population_std, slope};

/// Number of feature columns produced per interval.
pub const FEATURES_PER_INTERVAL: usize = 3;

/// Half-open index window `[start, end)` of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    /// Create an interval, requiring `start < end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(TsmlError::InvalidParameter(format!(
                "interval start {} must be below end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of points covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Validate a batch of series, returning the common series length.
///
/// # Errors
/// * [`TsmlError::EmptyData`] if the batch has no series or the series are empty
/// * [`TsmlError::ShapeMismatch`] if the series differ in length
pub fn check_batch(batch: &[Vec<f64>]) -> Result<usize> {
    let Some(first) = batch.first() else {
        return Err(TsmlError::EmptyData);
    };
    let series_length = first.len();
    if series_length == 0 {
        return Err(TsmlError::EmptyData);
    }
    if let Some(row) = batch.iter().find(|row| row.len() != series_length) {
        return Err(TsmlError::ShapeMismatch {
            expected: series_length,
            got: row.len(),
        });
    }
    Ok(series_length)
}

/// Build the interval feature matrix for a batch of series.
///
/// Row `i` holds, for every interval `j`, the mean, standard deviation and
/// slope of `batch[i][start_j..end_j]` at columns `3j`, `3j + 1`, `3j + 2`.
///
/// # Example
/// ```
/// use anofox_tsml::features::{interval_features, Interval};
///
/// let batch = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]];
/// let intervals = [Interval::new(0, 3).unwrap(), Interval::new(2, 6).unwrap()];
/// let features = interval_features(&batch, &intervals).unwrap();
///
/// assert_eq!(features[0].len(), 6);
/// assert_eq!(features[0][0], 2.0); // mean of [1, 2, 3]
/// assert_eq!(features[0][2], 1.0); // slope of [1, 2, 3]
/// ```
pub fn interval_features(batch: &[Vec<f64>], intervals: &[Interval]) -> Result<Vec<Vec<f64>>> {
    for interval in intervals {
        if interval.is_empty() {
            return Err(TsmlError::InvalidParameter(format!(
                "interval [{}, {}) is empty",
                interval.start, interval.end
            )));
        }
    }

    batch
        .iter()
        .map(|series| {
            let mut row = Vec::with_capacity(FEATURES_PER_INTERVAL * intervals.len());
            for interval in intervals {
                let window = series.get(interval.start..interval.end).ok_or_else(|| {
                    TsmlError::InvalidParameter(format!(
                        "interval [{}, {}) exceeds series length {}",
                        interval.start,
                        interval.end,
                        series.len()
                    ))
                })?;
                row.push(mean(window));
                row.push(population_std(window));
                row.push(slope(window));
            }
            Ok(row)
        })
        .collect()
}

/// Draw random intervals for a series of the given length.
///
/// Starts are uniform in `[0, series_length - min_interval)`; lengths are
/// uniform in `[0, series_length - start - 1)` and raised to `min_interval`.
/// Every interval fits inside the series.
pub fn sample_intervals<R: Rng + ?Sized>(
    rng: &mut R,
    n_intervals: usize,
    min_interval: usize,
    series_length: usize,
) -> Vec<Interval> {
    let min_interval = min_interval.clamp(1, series_length.max(1));

    (0..n_intervals)
        .map(|_| {
            let start = rng.gen_range(0..(series_length - min_interval).max(1));
            let length = rng
                .gen_range(0..(series_length - start).saturating_sub(1).max(1))
                .max(min_interval);
            Interval {
                start,
                end: start + length,
            }
        })
        .collect()
}
