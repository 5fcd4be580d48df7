//! Natural logarithm transformation.

use crate::error::{Result, TsmlError};

/// Natural log transform, the Box-Cox transform with lambda fixed at 0.
///
/// Compresses the variance of series whose spread grows with their level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogTransformer;

impl LogTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Apply `ln(x)` elementwise.
    ///
    /// Fails with [`TsmlError::NonPositiveData`] if any value is zero or negative.
    pub fn transform(&self, series: &[f64]) -> Result<Vec<f64>> {
        if series.iter().any(|&x| x <= 0.0) {
            return Err(TsmlError::NonPositiveData);
        }
        Ok(series.iter().map(|x| x.ln()).collect())
    }

    /// Apply `exp(z)` elementwise.
    pub fn inverse_transform(&self, transformed: &[f64]) -> Vec<f64> {
        transformed.iter().map(|z| z.exp()).collect()
    }
}
