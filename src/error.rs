//! Error types for the affordability pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AffordError>;

/// Main error type for the affordability pipeline
#[derive(Error, Debug)]
pub enum AffordError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Convergence failed after {iterations} iterations")]
    ConvergenceError { iterations: usize },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Tracking error: {0}")]
    TrackingError(String),
}

impl From<polars::error::PolarsError> for AffordError {
    fn from(err: polars::error::PolarsError) -> Self {
        AffordError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for AffordError {
    fn from(err: serde_json::Error) -> Self {
        AffordError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for AffordError {
    fn from(err: ndarray::ShapeError) -> Self {
        AffordError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
