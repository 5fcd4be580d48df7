//! Variance-stabilizing transformations for time series.
//!
//! Provides the Box-Cox power transform with lambda estimation
//! (maximum likelihood, probability-plot correlation, Guerrero) and the
//! natural log transform.
//!
//! # Example
//!
//! ```
//! use anofox_tsml::transform::{BoxCoxTransformer, LambdaMethod};
//!
//! // Four seasons of monthly data whose swing grows with the level
//! let series: Vec<f64> = (0..48)
//!     .map(|i| {
//!         let level = 100.0 * 1.1_f64.powi(i / 12);
//!         level * (1.0 + 0.2 * (i as f64 * std::f64::consts::PI / 6.0).sin())
//!     })
//!     .collect();
//!
//! let method = LambdaMethod::guerrero(Some(12)).unwrap();
//! let fitted = BoxCoxTransformer::new().with_method(method).fit(&series).unwrap();
//! let stabilized = fitted.transform(&series).unwrap();
//! assert_eq!(stabilized.len(), series.len());
//! ```

pub mod boxcox;
pub mod lambda;
pub mod log_transform;

// Re-export from boxcox
pub use boxcox::{
    boxcox, boxcox_auto, boxcox_conf_interval, boxcox_llf, check_boxcox_input, inv_boxcox,
    is_boxcox_suitable, BoxCoxResult, BoxCoxTransformer, FittedBoxCox,
};

// Re-export from lambda
pub use lambda::{
    estimate_lambda, estimate_lambda_all, Bounds, LambdaMethod, LambdaOptimizer, DEFAULT_BRACKET,
};

pub use log_transform::LogTransformer;
