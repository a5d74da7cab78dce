//! Wires the external providers to the forecasting and planning computations.
//!
//! Every operation fetches what it needs from the providers first and only
//! then computes; a provider failure aborts the call before any partial
//! result exists.

use crate::config::{ConfigurationStore, EngineConfig};
use crate::error::Result;
use capacity_planner::{
    CapacityDeficitCalculator, PlanningError, ScenarioSimulator, SimulationParameters,
    SimulationResult, ZoneAssessment, ZoneMetricsProvider,
};
use chrono::{Datelike, Months, NaiveDate};
use demand_forecast::{
    aggregate_monthly, BacktestEngine, BacktestReport, ForecastError, HistoricalSeriesProvider,
    PeriodTotal, SeasonalProjection, SeasonalProjector, WeekdayPattern,
    WeekdaySeasonalityAnalyzer,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything the forecasting side reports for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDashboard {
    pub as_of: NaiveDate,
    pub pattern: WeekdayPattern,
    pub projection: SeasonalProjection,
    pub backtest: BacktestReport,
}

pub struct PlanningEngine<H, Z> {
    history: H,
    zones: Z,
    config: EngineConfig,
    analyzer: WeekdaySeasonalityAnalyzer,
    projector: SeasonalProjector,
    backtester: BacktestEngine,
    calculator: CapacityDeficitCalculator,
    simulator: ScenarioSimulator,
}

impl<H, Z> PlanningEngine<H, Z>
where
    H: HistoricalSeriesProvider,
    Z: ZoneMetricsProvider,
{
    pub fn new(history: H, zones: Z, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let analyzer = WeekdaySeasonalityAnalyzer::new(config.forecast.seasonality.clone());
        let projector = SeasonalProjector::new(config.forecast.projection.clone());
        let backtester = BacktestEngine::from_config(&config.forecast)?;
        let calculator = CapacityDeficitCalculator::new(
            config.planner.capacity.clone(),
            config.planner.urgency.clone(),
        )?;
        let simulator = ScenarioSimulator::new(
            config.planner.constraints.clone(),
            config.planner.simulator.clone(),
        )?;

        Ok(Self {
            history,
            zones,
            config,
            analyzer,
            projector,
            backtester,
            calculator,
            simulator,
        })
    }

    pub fn from_store<S: ConfigurationStore + ?Sized>(history: H, zones: Z, store: &S) -> Result<Self> {
        Self::new(history, zones, store.load()?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Weekday pattern over the trailing window ending the day before `as_of`
    pub fn weekday_pattern(&self, as_of: NaiveDate) -> Result<WeekdayPattern> {
        let (start, end) = self.analyzer.trailing_window(as_of)?;
        let observations = self.history.observations(start, end)?;
        Ok(self.analyzer.analyze_as_of(&observations, as_of)?)
    }

    /// Month-end projection for the month containing `as_of`
    pub fn month_end_projection(&self, as_of: NaiveDate) -> Result<SeasonalProjection> {
        let pattern = self.weekday_pattern(as_of)?;
        self.project_with(&pattern, as_of)
    }

    fn project_with(&self, pattern: &WeekdayPattern, as_of: NaiveDate) -> Result<SeasonalProjection> {
        let month_to_date = self.history.observations(month_start(as_of)?, as_of)?;
        Ok(self.projector.project(pattern, &month_to_date, as_of)?)
    }

    /// Completed calendar months before the month of `as_of`
    pub fn monthly_history(&self, as_of: NaiveDate, months: u32) -> Result<Vec<PeriodTotal>> {
        let end = month_start(as_of)?;
        let start = end.checked_sub_months(Months::new(months)).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("{} months before {} is out of range", months, end))
        })?;

        let observations = self.history.observations(start, end)?;
        Ok(aggregate_monthly(&observations)?)
    }

    /// Walk-forward backtest over up to `history_months` completed months
    pub fn backtest(&self, as_of: NaiveDate, history_months: u32) -> Result<BacktestReport> {
        let series = self.monthly_history(as_of, history_months)?;
        Ok(self.backtester.run(&series)?)
    }

    pub fn forecast_dashboard(&self, as_of: NaiveDate, history_months: u32) -> Result<ForecastDashboard> {
        let pattern = self.weekday_pattern(as_of)?;
        let projection = self.project_with(&pattern, as_of)?;
        let backtest = self.backtest(as_of, history_months)?;

        info!(
            %as_of,
            projected_total = projection.total_projected_value,
            confidence = %projection.confidence_label,
            backtest_accuracy = backtest.summary.overall_accuracy,
            "Built forecast dashboard"
        );

        Ok(ForecastDashboard {
            as_of,
            pattern,
            projection,
            backtest,
        })
    }

    /// Every zone's deficit and urgency, most urgent first
    pub fn zone_assessments(&self) -> Result<Vec<ZoneAssessment>> {
        Ok(self.calculator.assess_provider(&self.zones)?)
    }

    /// Simulate a recruitment budget, optionally capped at one zone's unit shortfall
    pub fn simulate_recruitment(
        &self,
        params: &SimulationParameters,
        zone_id: Option<&str>,
    ) -> Result<SimulationResult> {
        let Some(zone_id) = zone_id else {
            return Ok(self.simulator.run(params)?);
        };

        let metrics = self.zones.zone_metrics()?;
        let metric = metrics
            .iter()
            .find(|m| m.zone_id == zone_id)
            .ok_or_else(|| PlanningError::InvalidParameter(format!("Unknown zone {}", zone_id)))?;

        let shortfall = self.calculator.analyze(metric)?.unit_shortfall();
        info!(zone = zone_id, shortfall, "Capping simulation at zone unit shortfall");

        let simulator = self.simulator.with_acquisition_target(shortfall.ceil())?;
        Ok(simulator.run(params)?)
    }
}

fn month_start(date: NaiveDate) -> Result<NaiveDate> {
    Ok(date
        .with_day(1)
        .ok_or_else(|| ForecastError::DataError(format!("No first day for {}", date)))?)
}
