//! Linear-trend model: least squares on the period index

use crate::config::ModelConfig;
use crate::data::PeriodTotal;
use crate::error::Result;
use crate::models::{average_order_value, counts, ensure_training, ForecastModel, ForecastResult, LINEAR_TREND};
use service_math::LinearTrend;

#[derive(Debug, Clone)]
pub struct LinearTrendModel {
    confidence: f64,
    average_order_value: Option<f64>,
}

impl LinearTrendModel {
    pub fn new(confidence: f64, average_order_value: Option<f64>) -> Self {
        Self {
            confidence,
            average_order_value,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.confidences.linear_trend, config.average_order_value)
    }
}

impl ForecastModel for LinearTrendModel {
    fn name(&self) -> &str {
        LINEAR_TREND
    }

    fn forecast(&self, training: &[PeriodTotal]) -> Result<ForecastResult> {
        ensure_training(LINEAR_TREND, training)?;

        let line = LinearTrend::fit(&counts(training))?;
        let predicted_count = line.forecast_next().max(0.0);
        let aov = average_order_value(self.average_order_value, training);

        Ok(ForecastResult::new(
            LINEAR_TREND,
            predicted_count,
            predicted_count * aov,
            self.confidence,
        ))
    }
}
