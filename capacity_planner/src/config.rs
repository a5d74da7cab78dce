//! Capacity and simulation settings.
//!
//! Defaults reproduce the operating assumptions the planners use today. The
//! demand split between service segments in particular is a modeling
//! approximation, not a measured distribution; override it once real segment
//! data is available.

use crate::error::{PlanningError, Result};
use serde::{Deserialize, Serialize};

/// Complete planner configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub capacity: CapacityConfig,
    pub urgency: UrgencyConfig,
    pub constraints: SimulationConstraints,
    pub simulator: SimulatorConfig,
}

impl PlannerConfig {
    /// Parse a configuration document, filling absent fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.capacity.validate()?;
        self.urgency.validate()?;
        self.constraints.validate()?;
        self.simulator.validate()?;
        self.simulator.validate_against(&self.constraints)
    }
}

/// Share of demand and service length of one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    /// Fraction of daily volume attributed to the segment
    pub demand_share: f64,
    /// Hours one unit is tied up per service
    pub duration_hours: f64,
}

/// Demand split by service-duration class.
///
/// The 60/30/10 default split is an assumption carried over from planning
/// practice, not derived from service records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentTable {
    pub local: SegmentSpec,
    pub longhaul: SegmentSpec,
    pub express: SegmentSpec,
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self {
            local: SegmentSpec { demand_share: 0.60, duration_hours: 6.0 },
            longhaul: SegmentSpec { demand_share: 0.30, duration_hours: 14.0 },
            express: SegmentSpec { demand_share: 0.10, duration_hours: 4.0 },
        }
    }
}

/// Converts nominal units into effective capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Share of units expected to turn down assignments
    pub rejection_ratio: f64,
    /// Operational efficiency of accepted units
    pub segment_efficiency: f64,
    /// Working hours one unit provides per day
    pub unit_hours_per_day: f64,
    pub segments: SegmentTable,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            rejection_ratio: 0.25,
            segment_efficiency: 0.85,
            unit_hours_per_day: 12.0,
            segments: SegmentTable::default(),
        }
    }
}

impl CapacityConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.rejection_ratio) {
            return Err(PlanningError::InvalidParameter(
                "Rejection ratio must lie in [0, 1)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.segment_efficiency) {
            return Err(PlanningError::InvalidParameter(
                "Segment efficiency must lie in [0, 1]".to_string(),
            ));
        }
        if self.unit_hours_per_day <= 0.0 {
            return Err(PlanningError::InvalidParameter(
                "Unit hours per day must be positive".to_string(),
            ));
        }

        let segments = [self.segments.local, self.segments.longhaul, self.segments.express];
        if segments
            .iter()
            .any(|s| s.demand_share < 0.0 || s.duration_hours <= 0.0)
        {
            return Err(PlanningError::InvalidParameter(
                "Segment shares must be >= 0 and durations > 0".to_string(),
            ));
        }
        let total_share: f64 = segments.iter().map(|s| s.demand_share).sum();
        if (total_share - 1.0).abs() > 1e-6 {
            return Err(PlanningError::InvalidParameter(format!(
                "Segment demand shares must sum to 1, got {}",
                total_share
            )));
        }

        Ok(())
    }
}

/// Weights of the urgency score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyConfig {
    /// Weight of the unmet share of daily volume
    pub deficit_weight: f64,
    /// Weight of the volume-per-unit load
    pub load_weight: f64,
    /// Services per unit per day treated as fully loaded
    pub load_saturation: f64,
    /// Scores at or above this mark a zone at risk
    pub risk_threshold: u8,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            deficit_weight: 0.7,
            load_weight: 0.3,
            load_saturation: 4.0,
            risk_threshold: 7,
        }
    }
}

impl UrgencyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.deficit_weight < 0.0 || self.load_weight < 0.0 {
            return Err(PlanningError::InvalidParameter(
                "Urgency weights cannot be negative".to_string(),
            ));
        }
        if self.load_saturation <= 0.0 {
            return Err(PlanningError::InvalidParameter(
                "Load saturation must be positive".to_string(),
            ));
        }
        if self.risk_threshold == 0 || self.risk_threshold > 10 {
            return Err(PlanningError::InvalidParameter(
                "Risk threshold must lie in 1..=10".to_string(),
            ));
        }
        Ok(())
    }
}

/// Limits every simulated allocation must respect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConstraints {
    /// Largest share of the budget any one channel may receive
    pub max_budget_per_channel_fraction: f64,
    /// ROI every funded channel has to reach, in percent
    pub min_roi_percent: f64,
    /// Upper bound on the simulated horizon, in days
    pub max_timeframe_days: Option<u32>,
    /// Acquisitions beyond this are worthless (e.g. a zone's unit shortfall)
    pub acquisition_target: Option<f64>,
}

impl Default for SimulationConstraints {
    fn default() -> Self {
        Self {
            max_budget_per_channel_fraction: 0.4,
            min_roi_percent: 200.0,
            max_timeframe_days: None,
            acquisition_target: None,
        }
    }
}

impl SimulationConstraints {
    pub fn validate(&self) -> Result<()> {
        if self.max_budget_per_channel_fraction <= 0.0 || self.max_budget_per_channel_fraction > 1.0 {
            return Err(PlanningError::InvalidParameter(
                "Per-channel budget fraction must lie in (0, 1]".to_string(),
            ));
        }
        if self.min_roi_percent < 0.0 {
            return Err(PlanningError::InvalidParameter(
                "Minimum ROI cannot be negative".to_string(),
            ));
        }
        if matches!(self.max_timeframe_days, Some(days) if days < 30) {
            return Err(PlanningError::InvalidParameter(
                "Maximum timeframe must be at least 30 days".to_string(),
            ));
        }
        if matches!(self.acquisition_target, Some(target) if target < 0.0 || !target.is_finite()) {
            return Err(PlanningError::InvalidParameter(
                "Acquisition target must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Monte-Carlo sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub iterations: usize,
    /// Relative bound of cost-per-acquisition perturbation
    pub cost_jitter: f64,
    /// Relative bound of channel capacity perturbation
    pub capacity_jitter: f64,
    /// Budget granularity of sampled allocations, as a fraction
    pub allocation_step: f64,
    /// Number of alternative scenarios to report
    pub alternatives: usize,
    /// Share of full-horizon acquisitions that defines the optimal timeline
    pub timeline_saturation: f64,
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            iterations: 5000,
            cost_jitter: 0.20,
            capacity_jitter: 0.15,
            allocation_step: 0.05,
            alternatives: 3,
            timeline_saturation: 0.95,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(PlanningError::InvalidParameter(
                "Simulation needs at least one iteration".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.cost_jitter) || !(0.0..1.0).contains(&self.capacity_jitter) {
            return Err(PlanningError::InvalidParameter(
                "Jitter bounds must lie in [0, 1)".to_string(),
            ));
        }
        if self.allocation_step <= 0.0 || self.allocation_step > 1.0 {
            return Err(PlanningError::InvalidParameter(
                "Allocation step must lie in (0, 1]".to_string(),
            ));
        }
        if self.timeline_saturation <= 0.0 || self.timeline_saturation > 1.0 {
            return Err(PlanningError::InvalidParameter(
                "Timeline saturation must lie in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// At least one allocation step has to fit under the per-channel cap
    pub fn validate_against(&self, constraints: &SimulationConstraints) -> Result<()> {
        if constraints.max_budget_per_channel_fraction / self.allocation_step + 1e-9 < 1.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "Allocation step {} exceeds the per-channel budget fraction {}",
                self.allocation_step, constraints.max_budget_per_channel_fraction
            )));
        }
        Ok(())
    }
}
