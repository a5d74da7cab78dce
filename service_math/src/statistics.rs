//! Descriptive statistics over plain `f64` slices

use crate::{MathError, Result, EPSILON};
use statrs::statistics::Statistics;

/// Arithmetic mean of a series
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().mean())
}

/// Population variance (divides by `n`, not `n - 1`)
pub fn population_variance(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the variance of an empty series".to_string(),
        ));
    }

    Ok(values.iter().population_variance().max(0.0))
}

/// Population standard deviation divided by the absolute mean.
///
/// A series centred on zero has no meaningful relative spread; it reports 0
/// when it is also flat and an error otherwise.
pub fn coefficient_of_variation(values: &[f64]) -> Result<f64> {
    let mu = mean(values)?;
    let sigma = population_variance(values)?.sqrt();

    if mu.abs() < EPSILON {
        if sigma < EPSILON {
            return Ok(0.0);
        }
        return Err(MathError::CalculationError(
            "Coefficient of variation is undefined for a zero-mean series".to_string(),
        ));
    }

    Ok(sigma / mu.abs())
}

/// Pearson correlation coefficient between two equally long series.
///
/// Returns 0 when either series is constant, since no co-movement can be
/// measured.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(MathError::InvalidInput(format!(
            "Series lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(MathError::InsufficientData(
            "Correlation needs at least 2 paired samples".to_string(),
        ));
    }

    let var_x = population_variance(xs)?;
    let var_y = population_variance(ys)?;
    if var_x < EPSILON || var_y < EPSILON {
        return Ok(0.0);
    }

    let cov = xs.iter().population_covariance(ys.iter());
    Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Absolute percentage error of a prediction, in percent.
///
/// `None` when the actual value is zero: the error is undefined there and
/// must be left out of any mean.
pub fn absolute_percentage_error(predicted: f64, actual: f64) -> Option<f64> {
    if actual.abs() < EPSILON {
        return None;
    }

    Some((predicted - actual).abs() / actual.abs() * 100.0)
}
