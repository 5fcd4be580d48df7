//! Feature extraction for fixed-length series.
//!
//! # Example
//!
//! ```
//! use anofox_tsml::features::{check_batch, interval_features, Interval};
//!
//! let batch = vec![vec![1.0, 3.0, 2.0, 5.0], vec![0.0, 1.0, 0.0, 1.0]];
//! let series_length = check_batch(&batch).unwrap();
//!
//! let features = interval_features(&batch, &[Interval::new(0, series_length).unwrap()]).unwrap();
//! assert_eq!(features.len(), 2);
//! assert_eq!(features[0].len(), 3);
//! ```

pub mod intervals;

pub use intervals::{
    check_batch, interval_features, sample_intervals, Interval, FEATURES_PER_INTERVAL,
};
