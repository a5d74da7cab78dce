//! Seasonal-naive model: the training mean scaled by a month factor

use crate::config::ModelConfig;
use crate::data::PeriodTotal;
use crate::error::Result;
use crate::models::{ensure_training, ForecastModel, ForecastResult, SEASONAL_NAIVE};
use chrono::Datelike;

/// Seasonal-naive model
#[derive(Debug, Clone)]
pub struct SeasonalNaiveModel {
    /// Multipliers indexed by calendar month, January first
    seasonal_factors: [f64; 12],
    confidence: f64,
}

impl SeasonalNaiveModel {
    pub fn new(seasonal_factors: [f64; 12], confidence: f64) -> Self {
        Self {
            seasonal_factors,
            confidence,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.seasonal_factors, config.confidences.seasonal_naive)
    }

    /// Factor applied to a calendar month (1-12)
    pub fn factor_for_month(&self, month: u32) -> f64 {
        self.seasonal_factors[((month + 11) % 12) as usize]
    }
}

impl ForecastModel for SeasonalNaiveModel {
    fn name(&self) -> &str {
        SEASONAL_NAIVE
    }

    fn forecast(&self, training: &[PeriodTotal]) -> Result<ForecastResult> {
        ensure_training(SEASONAL_NAIVE, training)?;

        let n = training.len() as f64;
        let mean_count = training.iter().map(|p| p.service_count as f64).sum::<f64>() / n;
        let mean_value = training.iter().map(|p| p.monetary_value).sum::<f64>() / n;

        let target_month = training[training.len() - 1].next_period_start()?.month();
        let factor = self.factor_for_month(target_month);

        Ok(ForecastResult::new(
            SEASONAL_NAIVE,
            mean_count * factor,
            mean_value * factor,
            self.confidence,
        ))
    }
}
