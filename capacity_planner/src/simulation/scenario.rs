//! Inputs and outputs of a recruitment budget simulation.

use crate::error::{PlanningError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Recruitment channel and its nominal economics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub cost_per_acquisition: f64,
    /// Acquisitions the channel can deliver per 30 days
    pub monthly_capacity: f64,
    pub roi_percent: f64,
}

impl Channel {
    pub fn new(
        id: impl Into<String>,
        cost_per_acquisition: f64,
        monthly_capacity: f64,
        roi_percent: f64,
    ) -> Self {
        Self {
            id: id.into(),
            cost_per_acquisition,
            monthly_capacity,
            roi_percent,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PlanningError::InvalidParameter(
                "Channel id cannot be empty".to_string(),
            ));
        }
        if !self.cost_per_acquisition.is_finite() || self.cost_per_acquisition <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "Channel {} needs a positive cost per acquisition",
                self.id
            )));
        }
        if !self.monthly_capacity.is_finite() || self.monthly_capacity < 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "Channel {} has a negative capacity",
                self.id
            )));
        }
        if !self.roi_percent.is_finite() {
            return Err(PlanningError::InvalidParameter(format!(
                "Channel {} has an invalid ROI",
                self.id
            )));
        }
        Ok(())
    }
}

/// Budget question posed to the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub budget: f64,
    /// Horizon in days, 30 to 365
    pub timeline_days: u32,
    pub channels: Vec<Channel>,
    /// Capacity multiplier per calendar month, January first
    pub seasonality_multipliers: [f64; 12],
    /// Calendar month (1-12) the campaign starts in
    pub start_month: u32,
}

impl SimulationParameters {
    pub fn new(budget: f64, timeline_days: u32, channels: Vec<Channel>) -> Self {
        Self {
            budget,
            timeline_days,
            channels,
            seasonality_multipliers: [1.0; 12],
            start_month: 1,
        }
    }

    pub fn with_seasonality(mut self, multipliers: [f64; 12], start_month: u32) -> Self {
        self.seasonality_multipliers = multipliers;
        self.start_month = start_month;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(PlanningError::InvalidParameter(
                "Budget must be positive".to_string(),
            ));
        }
        if !(30..=365).contains(&self.timeline_days) {
            return Err(PlanningError::InvalidParameter(format!(
                "Timeline must be 30 to 365 days, got {}",
                self.timeline_days
            )));
        }
        if self.channels.is_empty() {
            return Err(PlanningError::InvalidParameter(
                "At least one channel is required".to_string(),
            ));
        }
        for channel in &self.channels {
            channel.validate()?;
        }
        let mut ids: Vec<&str> = self.channels.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(PlanningError::InvalidParameter(
                "Channel ids must be unique".to_string(),
            ));
        }
        if self
            .seasonality_multipliers
            .iter()
            .any(|m| !m.is_finite() || *m < 0.0)
        {
            return Err(PlanningError::InvalidParameter(
                "Seasonality multipliers must be non-negative".to_string(),
            ));
        }
        if !(1..=12).contains(&self.start_month) {
            return Err(PlanningError::InvalidParameter(format!(
                "Start month must be 1-12, got {}",
                self.start_month
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Whether the recommended allocation met every constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConstraintStatus {
    Satisfied,
    /// No sampled allocation met the constraints; the result is a best effort
    Infeasible { violations: Vec<String> },
}

impl ConstraintStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ConstraintStatus::Satisfied)
    }
}

/// A runner-up allocation seen during sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeScenario {
    pub name: String,
    pub allocation: BTreeMap<String, f64>,
    pub expected_acquisitions: f64,
    /// Share of iterations that sampled this allocation
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Budget per channel id
    pub optimal_allocation: BTreeMap<String, f64>,
    pub expected_acquisitions: f64,
    /// 10th and 90th percentile of the recommended allocation's outcomes
    pub acquisitions_p10: f64,
    pub acquisitions_p90: f64,
    pub optimal_timeline_days: u32,
    pub risk_level: RiskLevel,
    pub alternative_scenarios: Vec<AlternativeScenario>,
    /// Correlation of channel spend with acquisitions, scaled to -100..=100
    pub sensitivity_by_channel: BTreeMap<String, f64>,
    pub constraint_status: ConstraintStatus,
    pub iterations: usize,
}

impl SimulationResult {
    pub fn allocated_budget(&self) -> f64 {
        self.optimal_allocation.values().sum()
    }
}
