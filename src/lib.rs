//! # Custody Ops Engine
//!
//! Demand forecasting and capacity simulation for field service operations.
//!
//! The workspace is split by concern:
//!
//! - [`service_math`]: trend fitting and descriptive statistics
//! - [`demand_forecast`]: weekday seasonality, month-end projection, monthly
//!   forecast models and walk-forward backtesting
//! - [`capacity_planner`]: zone capacity deficits, urgency and Monte-Carlo
//!   recruitment budget simulation
//!
//! [`PlanningEngine`] ties them to the data providers a hosting service
//! implements.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use custody_ops_engine::demand_forecast::{InMemorySeries, Observation};
//! use custody_ops_engine::capacity_planner::{StaticZoneMetrics, ZoneDemandMetric};
//! use custody_ops_engine::{EngineConfig, PlanningEngine};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history = InMemorySeries::new(
//!     start
//!         .iter_days()
//!         .take(200)
//!         .map(|d| Observation::new(d, 20, 9_000.0).unwrap())
//!         .collect(),
//! );
//! let zones = StaticZoneMetrics::new(vec![ZoneDemandMetric::new("north", 12, 30.0).unwrap()]);
//!
//! let engine = PlanningEngine::new(history, zones, EngineConfig::default()).unwrap();
//! let as_of = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//!
//! let projection = engine.month_end_projection(as_of).unwrap();
//! assert!(projection.total_projected_value > 0.0);
//!
//! let zones = engine.zone_assessments().unwrap();
//! assert_eq!(zones[0].metric.zone_id, "north");
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use capacity_planner;
pub use demand_forecast;
pub use service_math;

pub use crate::config::{ConfigurationStore, EngineConfig, JsonConfigurationStore};
pub use crate::engine::{ForecastDashboard, PlanningEngine};
pub use crate::error::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
