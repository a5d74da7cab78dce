//! # Service Math
//!
//! Numerical building blocks shared by the demand forecasting and capacity
//! planning crates. Nothing in here knows about services, zones or channels:
//! the functions operate on plain `f64` series.
//!
//! - [`trend`]: ordinary least squares trend lines and Holt's double
//!   exponential smoothing
//! - [`statistics`]: means, variances, correlation and percentage errors

use thiserror::Error;

pub mod statistics;
pub mod trend;

pub use statistics::{
    absolute_percentage_error, coefficient_of_variation, mean, pearson_correlation,
    population_variance,
};
pub use trend::{DoubleExponentialSmoothing, LinearTrend};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Tolerance below which a variance or denominator is treated as zero
pub const EPSILON: f64 = 1e-12;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 2 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 points"
        );
    }
}
