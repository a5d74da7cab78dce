//! Error types for the demand_forecast crate

use service_math::MathError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed record or impossible date arithmetic
    #[error("Data error: {0}")]
    DataError(String),

    /// Not enough history for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error from invalid parameters or configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The historical series collaborator failed to answer
    #[error("Upstream data source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON parsing
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
