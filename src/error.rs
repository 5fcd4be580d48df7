//! Error types for the anofox-tsml library.

use thiserror::Error;

/// Result type alias for estimation and prediction operations.
pub type Result<T> = std::result::Result<T, TsmlError>;

/// Errors that can occur during estimation, transformation or prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TsmlError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Series length differs from the one seen during training, or a batch is ragged.
    #[error("series length does not match training length: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Data contains zero or negative values where strictly positive data is required.
    #[error("data must be strictly positive")]
    NonPositiveData,

    /// All values are identical, so the transform is undefined.
    #[error("data must not be constant")]
    ConstantData,

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}
