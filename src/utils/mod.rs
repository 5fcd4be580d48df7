//! Numerical utilities shared by the transforms and regressors.

pub mod optimization;
pub mod parallel;
pub mod stats;

pub use optimization::{
    bounded_brent, bracket, brent, brentq, BoundedConfig, Bracket, BrentConfig, RootConfig,
    ScalarMinimum,
};
pub use parallel::WorkerPool;
pub use stats::{quantile_chi2_1df, quantile_normal};
