//! Walk-forward backtesting of the forecast model suite
//!
//! Each test period is forecast by every model from the periods strictly
//! before it. Periods are walked in order; a later period never leaks into
//! the training data of an earlier one.

use crate::config::ForecastConfig;
use crate::confidence::ConfidenceLabel;
use crate::data::PeriodTotal;
use crate::error::{ForecastError, Result};
use crate::models::{standard_suite, ForecastModel, ForecastResult};
use serde::{Deserialize, Serialize};
use service_math::absolute_percentage_error;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Training periods required before the first test period
pub const MIN_TRAINING_PERIODS: usize = 3;

/// One model's forecast for one test period, with its errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    pub forecast: ForecastResult,
    pub count_abs_error: f64,
    pub value_abs_error: f64,
    /// `None` when the actual count is zero
    pub count_ape: Option<f64>,
    /// `None` when the actual value is zero
    pub value_ape: Option<f64>,
}

impl ModelForecast {
    fn score(forecast: ForecastResult, actual_count: f64, actual_value: f64) -> Self {
        Self {
            count_abs_error: (forecast.predicted_count - actual_count).abs(),
            value_abs_error: (forecast.predicted_value - actual_value).abs(),
            count_ape: absolute_percentage_error(forecast.predicted_count, actual_count),
            value_ape: absolute_percentage_error(forecast.predicted_value, actual_value),
            forecast,
        }
    }
}

/// One step of the walk-forward trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestCase {
    pub period_label: String,
    pub actual_count: u64,
    pub actual_value: f64,
    pub forecasts: Vec<ModelForecast>,
    /// Headline errors, taken from the reference model
    pub count_ape: Option<f64>,
    pub value_ape: Option<f64>,
}

impl BacktestCase {
    pub fn forecast_for(&self, model_name: &str) -> Option<&ModelForecast> {
        self.forecasts
            .iter()
            .find(|f| f.forecast.model_name == model_name)
    }

    /// Error used to rank periods: mean count APE over every model, else
    /// mean value APE
    fn ranking_error(&self) -> Option<f64> {
        let mean_over = |ape: fn(&ModelForecast) -> Option<f64>| {
            let apes: Vec<f64> = self.forecasts.iter().filter_map(ape).collect();
            mean_of(&apes)
        };
        mean_over(|f| f.count_ape).or_else(|| mean_over(|f| f.value_ape))
    }
}

/// Mean errors of one model across the evaluated periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model_name: String,
    pub mape_count: Option<f64>,
    pub mape_value: Option<f64>,
    /// Periods with a defined count APE
    pub evaluated_periods: usize,
}

/// Aggregate view of a backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_periods: usize,
    /// Test periods whose headline error was defined
    pub evaluated_periods: usize,
    pub mape_count: Option<f64>,
    pub mape_value: Option<f64>,
    /// `100 - MAPE`, floored at zero
    pub overall_accuracy: f64,
    pub best_model_name: Option<String>,
    /// Periods ranked by the mean error of all models, not the headline
    pub best_period_label: Option<String>,
    pub worst_period_label: Option<String>,
    pub model_scores: Vec<ModelScore>,
    pub confidence_label: ConfidenceLabel,
}

/// Trace plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub cases: Vec<BacktestCase>,
    pub summary: BacktestSummary,
}

impl BacktestReport {
    /// Report for a series too short to test
    fn insufficient(total_periods: usize, models: &[Box<dyn ForecastModel>]) -> Self {
        Self {
            cases: Vec::new(),
            summary: BacktestSummary {
                total_periods,
                evaluated_periods: 0,
                mape_count: None,
                mape_value: None,
                overall_accuracy: 0.0,
                best_model_name: None,
                best_period_label: None,
                worst_period_label: None,
                model_scores: models
                    .iter()
                    .map(|m| ModelScore {
                        model_name: m.name().to_string(),
                        mape_count: None,
                        mape_value: None,
                        evaluated_periods: 0,
                    })
                    .collect(),
                confidence_label: ConfidenceLabel::Low,
            },
        }
    }

    /// True when the series was too short to run any test period
    pub fn is_insufficient(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Walk-forward evaluator over a set of competing models
#[derive(Debug)]
pub struct BacktestEngine {
    models: Vec<Box<dyn ForecastModel>>,
    reference_model: String,
    months_to_test: usize,
}

impl BacktestEngine {
    /// Create an engine; the last model is the reference model by default
    pub fn new(models: Vec<Box<dyn ForecastModel>>, months_to_test: usize) -> Result<Self> {
        let reference_model = models
            .last()
            .map(|m| m.name().to_string())
            .ok_or_else(|| ForecastError::InvalidParameter("Backtest needs at least one model".to_string()))?;
        if months_to_test == 0 {
            return Err(ForecastError::InvalidParameter(
                "Backtest must evaluate at least one period".to_string(),
            ));
        }

        Ok(Self {
            models,
            reference_model,
            months_to_test,
        })
    }

    /// Standard suite with the configured reference model and window
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(standard_suite(&config.models)?, config.backtest.months_to_test)?
            .with_reference_model(&config.backtest.reference_model)
    }

    /// Choose which model's errors headline each period
    pub fn with_reference_model(mut self, name: &str) -> Result<Self> {
        if !self.models.iter().any(|m| m.name() == name) {
            return Err(ForecastError::InvalidParameter(format!(
                "Unknown reference model '{}'",
                name
            )));
        }
        self.reference_model = name.to_string();
        Ok(self)
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// Run the walk-forward evaluation over a monthly series.
    ///
    /// Test periods run from `max(3, N - months_to_test)` to `N - 1`. A
    /// series too short for any test period yields an insufficient report
    /// labelled `low` instead of an error.
    pub fn run(&self, series: &[PeriodTotal]) -> Result<BacktestReport> {
        let total_periods = series.len();
        let first_test = MIN_TRAINING_PERIODS.max(total_periods.saturating_sub(self.months_to_test));

        if first_test >= total_periods {
            warn!(
                total_periods,
                "Backtest needs more than {} periods, reporting insufficient data",
                MIN_TRAINING_PERIODS
            );
            return Ok(BacktestReport::insufficient(total_periods, &self.models));
        }

        let mut cases = Vec::with_capacity(total_periods - first_test);
        for idx in first_test..total_periods {
            cases.push(self.evaluate_period(&series[..idx], &series[idx])?);
        }

        let summary = self.summarize(total_periods, &cases);
        info!(
            total_periods,
            evaluated = summary.evaluated_periods,
            accuracy = summary.overall_accuracy,
            best_model = summary.best_model_name.as_deref().unwrap_or("none"),
            "Backtest complete"
        );

        Ok(BacktestReport { cases, summary })
    }

    fn evaluate_period(&self, training: &[PeriodTotal], target: &PeriodTotal) -> Result<BacktestCase> {
        let actual_count = target.service_count as f64;
        let actual_value = target.monetary_value;

        let forecasts = self
            .models
            .iter()
            .map(|model| -> Result<ModelForecast> {
                Ok(ModelForecast::score(model.forecast(training)?, actual_count, actual_value))
            })
            .collect::<Result<Vec<_>>>()?;

        let (count_ape, value_ape) = forecasts
            .iter()
            .find(|f| f.forecast.model_name == self.reference_model)
            .map(|f| (f.count_ape, f.value_ape))
            .unwrap_or((None, None));

        if count_ape.is_none() || value_ape.is_none() {
            warn!(period = %target.label, "Zero actuals, period excluded from percentage errors");
        }
        debug!(period = %target.label, ?count_ape, ?value_ape, "Backtest period evaluated");

        Ok(BacktestCase {
            period_label: target.label.clone(),
            actual_count: target.service_count,
            actual_value,
            forecasts,
            count_ape,
            value_ape,
        })
    }

    fn summarize(&self, total_periods: usize, cases: &[BacktestCase]) -> BacktestSummary {
        let model_scores: Vec<ModelScore> = self
            .models
            .iter()
            .map(|model| {
                let name = model.name();
                let count_apes: Vec<f64> = cases
                    .iter()
                    .filter_map(|c| c.forecast_for(name).and_then(|f| f.count_ape))
                    .collect();
                let value_apes: Vec<f64> = cases
                    .iter()
                    .filter_map(|c| c.forecast_for(name).and_then(|f| f.value_ape))
                    .collect();
                ModelScore {
                    model_name: name.to_string(),
                    mape_count: mean_of(&count_apes),
                    mape_value: mean_of(&value_apes),
                    evaluated_periods: count_apes.len(),
                }
            })
            .collect();

        let best_model_name = model_scores
            .iter()
            .filter(|s| s.mape_count.is_some() || s.mape_value.is_some())
            .min_by(|a, b| {
                compare_optional(a.mape_count, b.mape_count)
                    .then_with(|| compare_optional(a.mape_value, b.mape_value))
            })
            .map(|s| s.model_name.clone());

        let ranked: Vec<(&BacktestCase, f64)> = cases
            .iter()
            .filter_map(|c| c.ranking_error().map(|e| (c, e)))
            .collect();
        let best_period_label = ranked
            .iter()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(c, _)| c.period_label.clone());
        let worst_period_label = ranked
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(c, _)| c.period_label.clone());

        let count_apes: Vec<f64> = cases.iter().filter_map(|c| c.count_ape).collect();
        let value_apes: Vec<f64> = cases.iter().filter_map(|c| c.value_ape).collect();
        let mape_count = mean_of(&count_apes);
        let mape_value = mean_of(&value_apes);
        let overall_accuracy = mape_count
            .or(mape_value)
            .map(|mape| (100.0 - mape).max(0.0))
            .unwrap_or(0.0);

        let evaluated_periods = ranked.len();
        let confidence_label = match evaluated_periods {
            n if n < MIN_TRAINING_PERIODS => ConfidenceLabel::Low,
            n if n < 2 * MIN_TRAINING_PERIODS => ConfidenceLabel::Medium,
            _ => ConfidenceLabel::High,
        };

        BacktestSummary {
            total_periods,
            evaluated_periods,
            mape_count,
            mape_value,
            overall_accuracy,
            best_model_name,
            best_period_label,
            worst_period_label,
            model_scores,
            confidence_label,
        }
    }
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Defined errors sort before undefined ones
fn compare_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::monthly;
    use crate::models::{DOUBLE_EXPONENTIAL, ENSEMBLE, LINEAR_TREND, SEASONAL_NAIVE};

    fn case(label: &str, reference: f64, others: f64) -> BacktestCase {
        let forecasts: Vec<ModelForecast> = [
            (SEASONAL_NAIVE, others),
            (LINEAR_TREND, others),
            (DOUBLE_EXPONENTIAL, others),
            (ENSEMBLE, reference),
        ]
        .iter()
        .map(|&(name, count)| {
            ModelForecast::score(ForecastResult::new(name, count, count * 10.0, 0.8), 100.0, 1_000.0)
        })
        .collect();
        let headline = forecasts.last().cloned();
        BacktestCase {
            period_label: label.to_string(),
            actual_count: 100,
            actual_value: 1_000.0,
            count_ape: headline.as_ref().and_then(|f| f.count_ape),
            value_ape: headline.as_ref().and_then(|f| f.value_ape),
            forecasts,
        }
    }

    #[test]
    fn short_series_is_reported_not_failed() {
        let engine = BacktestEngine::from_config(&ForecastConfig::default()).unwrap();
        let report = engine.run(&monthly(&[10, 20, 30], 1.0)).unwrap();

        assert!(report.is_insufficient());
        assert_eq!(report.summary.total_periods, 3);
        assert_eq!(report.summary.confidence_label, ConfidenceLabel::Low);
        assert_eq!(report.summary.best_model_name, None);
    }

    #[test]
    fn test_window_starts_after_minimum_training() {
        let engine = BacktestEngine::from_config(&ForecastConfig::default()).unwrap();
        let report = engine.run(&monthly(&[10, 11, 12, 13, 14], 1.0)).unwrap();

        let labels: Vec<&str> = report.cases.iter().map(|c| c.period_label.as_str()).collect();
        assert_eq!(labels, vec!["2023-04", "2023-05"]);
    }

    #[test]
    fn zero_actual_is_excluded_from_percentages() {
        let engine = BacktestEngine::from_config(&ForecastConfig::default()).unwrap();
        let report = engine.run(&monthly(&[10, 12, 14, 0, 18], 5.0)).unwrap();

        let zero_case = &report.cases[0];
        assert_eq!(zero_case.actual_count, 0);
        assert_eq!(zero_case.count_ape, None);
        assert!(zero_case.forecasts.iter().all(|f| f.count_abs_error > 0.0));
        assert_eq!(report.summary.evaluated_periods, 1);
        assert_eq!(report.summary.best_period_label.as_deref(), Some("2023-05"));
    }

    #[test]
    fn periods_rank_by_mean_error_of_all_models() {
        let engine = BacktestEngine::from_config(&ForecastConfig::default()).unwrap();
        // January: ensemble exact, the rest off by half. February: all close.
        let cases = vec![case("2024-01", 100.0, 50.0), case("2024-02", 90.0, 95.0)];

        let summary = engine.summarize(2, &cases);

        assert_eq!(summary.best_period_label.as_deref(), Some("2024-02"));
        assert_eq!(summary.worst_period_label.as_deref(), Some("2024-01"));
        assert_eq!(summary.evaluated_periods, 2);
    }

    #[test]
    fn reference_model_must_exist() {
        let engine = BacktestEngine::from_config(&ForecastConfig::default()).unwrap();
        assert_eq!(engine.model_names().last(), Some(&ENSEMBLE));
        assert!(engine.with_reference_model("arima").is_err());

        let engine = BacktestEngine::from_config(&ForecastConfig::default())
            .unwrap()
            .with_reference_model(LINEAR_TREND)
            .unwrap();
        let report = engine.run(&monthly(&[10, 20, 30, 40], 1.0)).unwrap();
        assert_eq!(report.cases[0].count_ape, Some(0.0));
    }
}
