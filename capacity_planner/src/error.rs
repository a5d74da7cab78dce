//! Error types for the capacity_planner crate

use service_math::MathError;
use thiserror::Error;

/// Errors raised while planning capacity or simulating budgets
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Error from invalid parameters or configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The zone metrics or configuration collaborator failed to answer
    #[error("Upstream data source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from JSON parsing
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PlanningError>;
