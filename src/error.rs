//! Error types for carrot

use thiserror::Error;

/// Result type alias for carrot operations
pub type Result<T> = std::result::Result<T, CarrotError>;

/// Main error type
#[derive(Error, Debug)]
pub enum CarrotError {
    #[error("'{0}' was provided in the include parameter, but is not among the available algorithms")]
    UnknownAlgorithm(String),

    #[error("'{0}' was provided as metric, but is not among the available metrics")]
    UnknownMetric(String),

    #[error("'{algorithm}' requires scaled features, but the setup was prepared without feature scaling")]
    FeatureScaling { algorithm: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Optimization error: {0}")]
    OptimizationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CarrotError {
    /// Whether the error was raised by argument validation, before any
    /// training work started.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CarrotError::UnknownAlgorithm(_)
                | CarrotError::UnknownMetric(_)
                | CarrotError::FeatureScaling { .. }
                | CarrotError::InvalidParameter { .. }
                | CarrotError::InvalidInput(_)
                | CarrotError::FeatureNotFound(_)
        )
    }
}

impl From<polars::error::PolarsError> for CarrotError {
    fn from(err: polars::error::PolarsError) -> Self {
        CarrotError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CarrotError {
    fn from(err: serde_json::Error) -> Self {
        CarrotError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CarrotError {
    fn from(err: ndarray::ShapeError) -> Self {
        CarrotError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
