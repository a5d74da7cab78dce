//! Double exponential smoothing (Holt) model

use crate::config::ModelConfig;
use crate::data::PeriodTotal;
use crate::error::{ForecastError, Result};
use crate::models::{
    average_order_value, counts, ensure_training, ForecastModel, ForecastResult, DOUBLE_EXPONENTIAL,
};
use service_math::DoubleExponentialSmoothing;

#[derive(Debug, Clone)]
pub struct DoubleExponentialModel {
    /// Level smoothing weight
    alpha: f64,
    /// Trend smoothing weight
    beta: f64,
    confidence: f64,
    average_order_value: Option<f64>,
}

impl DoubleExponentialModel {
    pub fn new(alpha: f64, beta: f64, confidence: f64, average_order_value: Option<f64>) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 || beta <= 0.0 || beta >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Smoothing weights must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        Ok(Self {
            alpha,
            beta,
            confidence,
            average_order_value,
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::new(
            config.level_weight,
            config.trend_weight,
            config.confidences.double_exponential,
            config.average_order_value,
        )
    }
}

impl ForecastModel for DoubleExponentialModel {
    fn name(&self) -> &str {
        DOUBLE_EXPONENTIAL
    }

    fn forecast(&self, training: &[PeriodTotal]) -> Result<ForecastResult> {
        ensure_training(DOUBLE_EXPONENTIAL, training)?;

        let smoother = DoubleExponentialSmoothing::fit(self.alpha, self.beta, &counts(training))?;
        let predicted_count = smoother.forecast(1)?.max(0.0);
        let aov = average_order_value(self.average_order_value, training);

        Ok(ForecastResult::new(
            DOUBLE_EXPONENTIAL,
            predicted_count,
            predicted_count * aov,
            self.confidence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::monthly;
    use approx::assert_abs_diff_eq;

    #[test]
    fn follows_level_plus_trend() {
        let training = monthly(&[10, 20, 30], 2.0);
        let result = DoubleExponentialModel::from_config(&ModelConfig::default())
            .unwrap()
            .forecast(&training)
            .unwrap();

        assert_abs_diff_eq!(result.predicted_count, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.predicted_value, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn single_period_repeats_it() {
        let result = DoubleExponentialModel::new(0.3, 0.1, 0.75, None)
            .unwrap()
            .forecast(&monthly(&[42], 1.0))
            .unwrap();
        assert_abs_diff_eq!(result.predicted_count, 42.0);
    }

    #[test]
    fn rejects_out_of_range_weights() {
        assert!(DoubleExponentialModel::new(1.0, 0.1, 0.75, None).is_err());
    }
}
