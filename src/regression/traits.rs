//! TreeRegressor trait defining the interface ensemble members implement.

use crate::error::Result;

/// A regression model over numeric feature matrices.
///
/// Rows of a feature matrix are instances, columns are features. After
/// `fit`, `predict` must be deterministic and must not mutate the model, so
/// fitted models can be shared across worker threads.
pub trait TreeRegressor: Send + Sync {
    /// Fit the model to a feature matrix and one target per row.
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict one value per row of the feature matrix.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed regressor trait objects.
pub type BoxedTreeRegressor = Box<dyn TreeRegressor>;

impl TreeRegressor for BoxedTreeRegressor {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        (**self).fit(features, targets)
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        (**self).predict(features)
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}
