//! # Demand Forecast
//!
//! Forecasting of daily and monthly service demand for capacity planning.
//!
//! ## Features
//!
//! - Strict daily [`Observation`]s, normalized once at the provider boundary
//! - Weekday seasonality extraction with a sample-count confidence
//! - Month-end projection with a one-day reporting lag and momentum correction
//! - A suite of interchangeable monthly models (seasonal-naive, linear trend,
//!   Holt double exponential, weighted ensemble)
//! - Walk-forward backtesting that ranks the models on held-out months
//!
//! Every component is a pure function of its inputs. Data is fetched through
//! [`HistoricalSeriesProvider`] before any computation runs.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use demand_forecast::{
//!     Observation, SeasonalProjector, WeekdaySeasonalityAnalyzer,
//! };
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let history: Vec<Observation> = start
//!     .iter_days()
//!     .take(90)
//!     .map(|d| Observation::new(d, 50, 300_000.0).unwrap())
//!     .collect();
//!
//! let pattern = WeekdaySeasonalityAnalyzer::default().analyze(&history);
//! assert_eq!(pattern.confidence(), 0.85);
//!
//! let reference = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
//! let projection = SeasonalProjector::default()
//!     .project(&pattern, &history, reference)
//!     .unwrap();
//! assert!(projection.total_projected_value > 0.0);
//! ```

pub mod backtest;
pub mod confidence;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod projection;
pub mod seasonality;

// Re-export commonly used types
pub use crate::backtest::{BacktestCase, BacktestEngine, BacktestReport, BacktestSummary, ModelScore};
pub use crate::confidence::ConfidenceLabel;
pub use crate::config::ForecastConfig;
pub use crate::data::{
    aggregate_daily, aggregate_monthly, completed_before, DataLoader, HistoricalSeriesProvider,
    InMemorySeries, Observation, PeriodTotal, RawServiceRecord,
};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, ForecastResult};
pub use crate::projection::{DailyProjection, SeasonalProjection, SeasonalProjector};
pub use crate::seasonality::{PatternSource, WeekdayAverage, WeekdayPattern, WeekdaySeasonalityAnalyzer};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
