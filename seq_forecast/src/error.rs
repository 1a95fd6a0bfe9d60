//! Error types for the seq_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the seq_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is too short for the requested look-back and horizon
    #[error("Insufficient data: need at least {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// `forecast` (or a scaler transform) was called before fitting
    #[error("Forecaster has not been trained")]
    NotTrained,

    /// A metric window extends past the available data
    #[error("Invalid window: {window} values requested, {available} available")]
    InvalidWindow { window: usize, available: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error raised while fitting or evaluating a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Tensor handed to a model has the wrong dimensions
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Error from shared math utilities
    #[error("Math error: {0}")]
    Math(MathError),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InvalidWindow { window, available } => {
                ForecastError::InvalidWindow { window, available }
            }
            other => ForecastError::Math(other),
        }
    }
}
