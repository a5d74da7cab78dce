//! Fixed-weight ensemble of the three base models

use crate::config::{EnsembleWeights, ModelConfig};
use crate::data::PeriodTotal;
use crate::error::{ForecastError, Result};
use crate::models::{
    DoubleExponentialModel, ForecastModel, ForecastResult, LinearTrendModel, SeasonalNaiveModel, ENSEMBLE,
};

#[derive(Debug, Clone)]
pub struct EnsembleModel {
    seasonal: SeasonalNaiveModel,
    linear: LinearTrendModel,
    double_exponential: DoubleExponentialModel,
    weights: EnsembleWeights,
    confidence: f64,
}

impl EnsembleModel {
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        if config.ensemble_weights.total() <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Ensemble weights must sum to a positive number".to_string(),
            ));
        }

        Ok(Self {
            seasonal: SeasonalNaiveModel::from_config(config),
            linear: LinearTrendModel::from_config(config),
            double_exponential: DoubleExponentialModel::from_config(config)?,
            weights: config.ensemble_weights,
            confidence: config.confidences.ensemble,
        })
    }
}

impl ForecastModel for EnsembleModel {
    fn name(&self) -> &str {
        ENSEMBLE
    }

    fn forecast(&self, training: &[PeriodTotal]) -> Result<ForecastResult> {
        let members = [
            (self.weights.seasonal_naive, self.seasonal.forecast(training)?),
            (self.weights.linear_trend, self.linear.forecast(training)?),
            (self.weights.double_exponential, self.double_exponential.forecast(training)?),
        ];

        // Normalized so weights that do not sum to one still average
        let total = self.weights.total();
        let (count, value) = members.iter().fold((0.0, 0.0), |(count, value), (w, f)| {
            (count + w * f.predicted_count, value + w * f.predicted_value)
        });

        Ok(ForecastResult::new(ENSEMBLE, count / total, value / total, self.confidence))
    }
}
