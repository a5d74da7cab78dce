//! # Capacity Planner
//!
//! Turns zone demand into staffing decisions.
//!
//! - [`deficit`]: segment capacity deficits and a 0-10 urgency score per zone
//! - [`simulation`]: Monte-Carlo search for the recruitment budget split that
//!   maximizes acquisitions under per-channel and ROI constraints
//!
//! Zone metrics and settings arrive through [`ZoneMetricsProvider`] and
//! [`PlannerConfig`]; nothing here performs I/O on its own.
//!
//! ```rust
//! use capacity_planner::{CapacityDeficitCalculator, ZoneDemandMetric};
//!
//! let calculator = CapacityDeficitCalculator::default();
//! let zone = ZoneDemandMetric::new("harbour", 10, 0.0).unwrap();
//! let assessment = calculator.assess(&zone).unwrap();
//! assert_eq!(assessment.deficit.deficit_total, 0.0);
//! assert!(!assessment.at_risk);
//! ```

pub mod config;
pub mod deficit;
pub mod error;
pub mod simulation;
pub mod zone;

pub use crate::config::{
    CapacityConfig, PlannerConfig, SegmentSpec, SegmentTable, SimulationConstraints,
    SimulatorConfig, UrgencyConfig,
};
pub use crate::deficit::{
    CapacityDeficitCalculator, DeficitAnalysis, Segment, SegmentFigure, UrgencyScore,
    ZoneAssessment,
};
pub use crate::error::{PlanningError, Result};
pub use crate::simulation::{
    AlternativeScenario, Channel, ConstraintStatus, RiskLevel, ScenarioSimulator,
    SimulationParameters, SimulationResult,
};
pub use crate::zone::{StaticZoneMetrics, ZoneDemandMetric, ZoneMetricsProvider};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
