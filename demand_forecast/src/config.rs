//! Tunable tables and thresholds for the forecasting components.
//!
//! Every constant the analyzers and models rely on lives here so it can be
//! overridden from a configuration store (JSON) or in tests. Missing fields
//! fall back to the defaults below.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Month multipliers (January first) used by the seasonal-naive model
pub const DEFAULT_SEASONAL_FACTORS: [f64; 12] = [
    0.85, 0.90, 0.95, 1.00, 1.10, 1.20, 1.15, 1.10, 1.00, 0.95, 0.90, 0.90,
];

/// Complete forecasting configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub seasonality: SeasonalityConfig,
    pub projection: ProjectionConfig,
    pub models: ModelConfig,
    pub backtest: BacktestConfig,
}

impl ForecastConfig {
    /// Parse a configuration document, filling absent fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.seasonality.validate()?;
        self.projection.validate()?;
        self.models.validate()?;
        self.backtest.validate()
    }
}

/// Weekday pattern extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityConfig {
    /// Length of the trailing history window, in months
    pub window_months: u32,
    /// Total samples needed before the pattern is trusted
    pub high_confidence_min_samples: usize,
    pub high_confidence: f64,
    pub low_confidence: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            window_months: 3,
            high_confidence_min_samples: 30,
            high_confidence: 0.85,
            low_confidence: 0.6,
        }
    }
}

impl SeasonalityConfig {
    fn validate(&self) -> Result<()> {
        if self.window_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "Seasonality window must span at least one month".to_string(),
            ));
        }
        check_unit_interval("high_confidence", self.high_confidence)?;
        check_unit_interval("low_confidence", self.low_confidence)
    }
}

/// Month-end projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Relative outperformance over the pattern that triggers momentum
    pub momentum_threshold: f64,
    /// Multiplier applied to the projected total under momentum
    pub momentum_multiplier: f64,
    /// Pattern confidence must exceed this for a `high` label
    pub high_confidence_threshold: f64,
    /// Days of month-to-date data needed for a `high` label
    pub high_confidence_min_days: usize,
    /// Pattern confidence below this forces a `low` label
    pub low_confidence_threshold: f64,
    /// Elapsed days below this force a `low` label
    pub low_confidence_min_days: u32,
    /// Daily value assumed when there is no history at all
    pub fallback_daily_value: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            momentum_threshold: 0.10,
            momentum_multiplier: 1.05,
            high_confidence_threshold: 0.8,
            high_confidence_min_days: 8,
            low_confidence_threshold: 0.6,
            low_confidence_min_days: 5,
            fallback_daily_value: 50_000.0,
        }
    }
}

impl ProjectionConfig {
    fn validate(&self) -> Result<()> {
        if self.momentum_threshold < 0.0 || self.momentum_multiplier < 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Momentum threshold must be >= 0 and multiplier >= 1".to_string(),
            ));
        }
        if self.fallback_daily_value < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Fallback daily value cannot be negative".to_string(),
            ));
        }
        check_unit_interval("high_confidence_threshold", self.high_confidence_threshold)?;
        check_unit_interval("low_confidence_threshold", self.low_confidence_threshold)
    }
}

/// Weights of the ensemble members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub seasonal_naive: f64,
    pub linear_trend: f64,
    pub double_exponential: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            seasonal_naive: 0.4,
            linear_trend: 0.2,
            double_exponential: 0.4,
        }
    }
}

impl EnsembleWeights {
    pub fn total(&self) -> f64 {
        self.seasonal_naive + self.linear_trend + self.double_exponential
    }
}

/// Confidence each model reports alongside its forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfidences {
    pub seasonal_naive: f64,
    pub linear_trend: f64,
    pub double_exponential: f64,
    pub ensemble: f64,
}

impl Default for ModelConfidences {
    fn default() -> Self {
        Self {
            seasonal_naive: 0.70,
            linear_trend: 0.65,
            double_exponential: 0.75,
            ensemble: 0.85,
        }
    }
}

/// Forecast model suite settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub seasonal_factors: [f64; 12],
    /// Holt level smoothing weight
    pub level_weight: f64,
    /// Holt trend smoothing weight
    pub trend_weight: f64,
    pub ensemble_weights: EnsembleWeights,
    pub confidences: ModelConfidences,
    /// Fixed value per service; `None` derives it from the training window
    pub average_order_value: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seasonal_factors: DEFAULT_SEASONAL_FACTORS,
            level_weight: 0.3,
            trend_weight: 0.1,
            ensemble_weights: EnsembleWeights::default(),
            confidences: ModelConfidences::default(),
            average_order_value: None,
        }
    }
}

impl ModelConfig {
    fn validate(&self) -> Result<()> {
        if self.seasonal_factors.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Seasonal factors must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.level_weight) || self.level_weight == 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Level weight must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.trend_weight) || self.trend_weight == 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Trend weight must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        let w = &self.ensemble_weights;
        for (name, weight) in [
            ("seasonal_naive", w.seasonal_naive),
            ("linear_trend", w.linear_trend),
            ("double_exponential", w.double_exponential),
        ] {
            check_unit_interval(name, weight)?;
        }
        if w.total() <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "At least one ensemble weight must be positive".to_string(),
            ));
        }

        let c = &self.confidences;
        for (name, confidence) in [
            ("seasonal_naive", c.seasonal_naive),
            ("linear_trend", c.linear_trend),
            ("double_exponential", c.double_exponential),
            ("ensemble", c.ensemble),
        ] {
            check_unit_interval(name, confidence)?;
        }
        if c.ensemble < c.seasonal_naive.max(c.linear_trend).max(c.double_exponential) {
            return Err(ForecastError::InvalidParameter(
                "Ensemble confidence must not be lower than any member's".to_string(),
            ));
        }

        if let Some(aov) = self.average_order_value {
            if !aov.is_finite() || aov < 0.0 {
                return Err(ForecastError::InvalidParameter(
                    "Average order value cannot be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Walk-forward evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// How many trailing periods to evaluate
    pub months_to_test: usize,
    /// Model whose forecast is reported as the headline per period
    pub reference_model: String,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            months_to_test: 6,
            reference_model: crate::models::ENSEMBLE.to_string(),
        }
    }
}

impl BacktestConfig {
    fn validate(&self) -> Result<()> {
        if self.months_to_test == 0 {
            return Err(ForecastError::InvalidParameter(
                "Backtest must evaluate at least one period".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ForecastError::InvalidParameter(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ForecastConfig::from_json(
            r#"{ "models": { "average_order_value": 6000.0 }, "backtest": { "months_to_test": 4 } }"#,
        )
        .unwrap();

        assert_eq!(config.models.average_order_value, Some(6000.0));
        assert_eq!(config.models.level_weight, 0.3);
        assert_eq!(config.backtest.months_to_test, 4);
        assert_eq!(config.seasonality.window_months, 3);
    }

    #[test]
    fn rejects_weak_ensemble_confidence() {
        let mut config = ForecastConfig::default();
        config.models.confidences.ensemble = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
