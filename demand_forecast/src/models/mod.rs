//! Forecasting models for monthly service demand
//!
//! All models share one contract: given the periods strictly before the
//! target, predict the next period's service count and monetary value.

use crate::config::ModelConfig;
use crate::data::PeriodTotal;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod double_exponential;
pub mod ensemble;
pub mod linear_trend;
pub mod seasonal_naive;

pub use double_exponential::DoubleExponentialModel;
pub use ensemble::EnsembleModel;
pub use linear_trend::LinearTrendModel;
pub use seasonal_naive::SeasonalNaiveModel;

pub const SEASONAL_NAIVE: &str = "seasonal_naive";
pub const LINEAR_TREND: &str = "linear_trend";
pub const DOUBLE_EXPONENTIAL: &str = "double_exponential";
pub const ENSEMBLE: &str = "ensemble";

/// One-period-ahead point forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_count: f64,
    pub predicted_value: f64,
    /// Always within [0, 1]
    pub confidence: f64,
    pub model_name: String,
}

impl ForecastResult {
    /// Create a forecast; negative predictions are floored at zero
    pub fn new(model_name: &str, predicted_count: f64, predicted_value: f64, confidence: f64) -> Self {
        Self {
            predicted_count: predicted_count.max(0.0),
            predicted_value: predicted_value.max(0.0),
            confidence: confidence.clamp(0.0, 1.0),
            model_name: model_name.to_string(),
        }
    }
}

/// Common interface for forecasting models
pub trait ForecastModel: Debug + Send + Sync {
    /// Name used in backtest reports
    fn name(&self) -> &str;

    /// Forecast the period following the last training period
    fn forecast(&self, training: &[PeriodTotal]) -> Result<ForecastResult>;
}

/// The three base models followed by the ensemble
pub fn standard_suite(config: &ModelConfig) -> Result<Vec<Box<dyn ForecastModel>>> {
    Ok(vec![
        Box::new(SeasonalNaiveModel::from_config(config)),
        Box::new(LinearTrendModel::from_config(config)),
        Box::new(DoubleExponentialModel::from_config(config)?),
        Box::new(EnsembleModel::from_config(config)?),
    ])
}

pub(crate) fn ensure_training(model: &str, training: &[PeriodTotal]) -> Result<()> {
    if training.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "{} needs at least one training period",
            model
        )));
    }
    Ok(())
}

/// Value per service: the configured constant, else the training window's
/// total value over total count.
pub(crate) fn average_order_value(configured: Option<f64>, training: &[PeriodTotal]) -> f64 {
    if let Some(aov) = configured {
        return aov;
    }

    let count: u64 = training.iter().map(|p| p.service_count).sum();
    let value: f64 = training.iter().map(|p| p.monetary_value).sum();
    if count == 0 {
        0.0
    } else {
        value / count as f64
    }
}

pub(crate) fn counts(training: &[PeriodTotal]) -> Vec<f64> {
    training.iter().map(|p| p.service_count as f64).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::data::PeriodTotal;

    /// Monthly periods from January 2023 with the given counts and a fixed
    /// value per service
    pub fn monthly(counts: &[u64], value_per_service: f64) -> Vec<PeriodTotal> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let year = 2023 + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                PeriodTotal::month(year, month, count, count as f64 * value_per_service).unwrap()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_contains_all_models_with_ensemble_last() {
        let suite = standard_suite(&ModelConfig::default()).unwrap();
        let names: Vec<&str> = suite.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec![SEASONAL_NAIVE, LINEAR_TREND, DOUBLE_EXPONENTIAL, ENSEMBLE]);
    }

    #[test]
    fn forecast_result_clamps() {
        let result = ForecastResult::new("x", -3.0, -10.0, 1.5);
        assert_eq!(result.predicted_count, 0.0);
        assert_eq!(result.predicted_value, 0.0);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn every_model_rejects_empty_training() {
        for model in standard_suite(&ModelConfig::default()).unwrap() {
            assert!(matches!(
                model.forecast(&[]),
                Err(ForecastError::InsufficientData(_))
            ));
        }
    }

    #[test]
    fn average_order_value_prefers_configuration() {
        let training = test_support::monthly(&[10, 10], 600.0);
        assert_eq!(average_order_value(None, &training), 600.0);
        assert_eq!(average_order_value(Some(42.0), &training), 42.0);
        assert_eq!(average_order_value(None, &test_support::monthly(&[0], 1.0)), 0.0);
    }
}
