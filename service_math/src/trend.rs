//! Trend estimators for short demand series
//!
//! - Linear trend (ordinary least squares against a zero-based index)
//! - Double Exponential Smoothing (Holt's method)

use crate::{MathError, Result, EPSILON};
use serde::{Deserialize, Serialize};

/// Least squares trend line fitted against the index `0..n`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    slope: f64,
    intercept: f64,
    points: usize,
}

impl LinearTrend {
    /// Fit a trend line to the series.
    ///
    /// A single point yields a flat line through that point.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Not enough data for a trend line. Need at least 1 point.".to_string(),
            ));
        }

        let n = values.len() as f64;
        let x_mean = (values.len() - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        let slope = if denominator.abs() < EPSILON {
            0.0
        } else {
            numerator / denominator
        };

        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
            points: values.len(),
        })
    }

    /// Value of the line at index `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Value of the line one step past the last fitted point
    pub fn forecast_next(&self) -> f64 {
        self.predict(self.points as f64)
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of points the line was fitted on
    pub fn points(&self) -> usize {
        self.points
    }
}

/// Double Exponential Smoothing (Holt's Method)
#[derive(Debug, Clone)]
pub struct DoubleExponentialSmoothing {
    alpha: f64,
    beta: f64,
    level: Option<f64>,
    trend: Option<f64>,
    values_seen: usize,
}

impl DoubleExponentialSmoothing {
    /// Create a smoother with level weight `alpha` and trend weight `beta`
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if beta <= 0.0 || beta >= 1.0 {
            return Err(MathError::InvalidInput(
                "Beta must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        Ok(Self {
            alpha,
            beta,
            level: None,
            trend: None,
            values_seen: 0,
        })
    }

    /// Build a smoother and feed it the whole series in order
    pub fn fit(alpha: f64, beta: f64, values: &[f64]) -> Result<Self> {
        let mut smoother = Self::new(alpha, beta)?;
        for &value in values {
            smoother.update(value)?;
        }
        Ok(smoother)
    }

    /// Feed the next observation.
    ///
    /// The first value seeds the level; the second seeds the trend with the
    /// first difference before regular smoothing starts.
    pub fn update(&mut self, value: f64) -> Result<()> {
        self.values_seen += 1;

        match (self.level, self.trend) {
            (None, None) => {
                self.level = Some(value);
                self.trend = Some(0.0);
            }
            (Some(prev_level), Some(_)) if self.values_seen == 2 => {
                self.level = Some(value);
                self.trend = Some(value - prev_level);
            }
            (Some(prev_level), Some(prev_trend)) => {
                let new_level = self.alpha * value + (1.0 - self.alpha) * (prev_level + prev_trend);
                let new_trend =
                    self.beta * (new_level - prev_level) + (1.0 - self.beta) * prev_trend;

                self.level = Some(new_level);
                self.trend = Some(new_trend);
            }
            _ => {
                return Err(MathError::CalculationError(
                    "Inconsistent state: level and trend should both be Some or None".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Forecast `h` steps ahead
    pub fn forecast(&self, h: usize) -> Result<f64> {
        match (self.level, self.trend) {
            (Some(level), Some(trend)) => Ok(level + (h as f64) * trend),
            _ => Err(MathError::InsufficientData(
                "Not enough data to make a forecast".to_string(),
            )),
        }
    }
}
