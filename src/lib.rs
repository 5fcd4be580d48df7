//! # anofox-tsml
//!
//! Time series machine learning primitives.
//!
//! Provides variance-stabilizing transforms (Box-Cox with lambda estimation
//! and confidence intervals, natural log) and the time series forest
//! regressor, an ensemble of regression trees over random interval
//! summary features.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod error;
pub mod features;
pub mod regression;
pub mod transform;
pub mod utils;

pub use error::{Result, TsmlError};

pub mod prelude {
    pub use crate::error::{Result, TsmlError};
    pub use crate::features::Interval;
    pub use crate::regression::{
        DecisionTreeRegressor, ForestConfig, TimeSeriesForestRegressor, TreeRegressor,
    };
    pub use crate::transform::{
        boxcox, boxcox_auto, inv_boxcox, Bounds, BoxCoxTransformer, FittedBoxCox, LambdaMethod,
        LogTransformer,
    };
    pub use crate::utils::WorkerPool;
}
