//! Interval-based regression for fixed-length time series.
//!
//! Provides a deterministic CART regression tree and the time series forest
//! built on top of it.
//!
//! # Example
//!
//! ```
//! use anofox_tsml::regression::{ForestConfig, TimeSeriesForestRegressor};
//!
//! let batch: Vec<Vec<f64>> = (0..30)
//!     .map(|i| (0..16).map(|t| (i * t) as f64 * 0.1).collect())
//!     .collect();
//! let targets: Vec<f64> = (0..30).map(|i| i as f64 * 0.1).collect();
//!
//! let mut forest = TimeSeriesForestRegressor::new(
//!     ForestConfig::new(10).with_seed(42).with_n_jobs(-1),
//! );
//! forest.fit(&batch, &targets).unwrap();
//! assert_eq!(forest.predict(&batch).unwrap().len(), 30);
//! ```

pub mod forest;
pub mod traits;
pub mod tree;

pub use forest::{aggregate_predictions, EnsembleMember, ForestConfig, TimeSeriesForestRegressor};
pub use traits::{BoxedTreeRegressor, TreeRegressor};
pub use tree::{DecisionTreeRegressor, TreeConfig};
