//! Monte-Carlo search over recruitment budget allocations.
//!
//! Every iteration draws a random split of the budget in fixed steps, perturbs
//! each funded channel's cost and capacity, and records the acquisitions the
//! split produced. Identical splits are pooled, and the pool with the best mean
//! among those that satisfied the ROI floor in most of their draws becomes the
//! recommendation.

mod scenario;

pub use scenario::{
    AlternativeScenario, Channel, ConstraintStatus, RiskLevel, SimulationParameters,
    SimulationResult,
};

use crate::config::{SimulationConstraints, SimulatorConfig};
use crate::error::{PlanningError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use service_math::{coefficient_of_variation, pearson_correlation};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Share of draws an allocation must pass the ROI floor in to count as feasible
const FEASIBLE_SHARE: f64 = 0.5;

/// ROI headroom below which the recommendation is treated as fragile
const THIN_ROI_MARGIN: f64 = 0.10;

/// Multiplicative noise around 1.0, clamped to `1 ± bound`
struct Perturbation {
    normal: Option<Normal<f64>>,
    bound: f64,
}

impl Perturbation {
    fn new(bound: f64) -> Result<Self> {
        if bound <= 0.0 {
            return Ok(Self { normal: None, bound: 0.0 });
        }

        // Two standard deviations reach the bound
        let normal = Normal::new(1.0, bound / 2.0).map_err(|e| {
            PlanningError::InvalidParameter(format!("Invalid jitter {}: {}", bound, e))
        })?;

        Ok(Self {
            normal: Some(normal),
            bound,
        })
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match &self.normal {
            Some(normal) => normal.sample(rng).clamp(1.0 - self.bound, 1.0 + self.bound),
            None => 1.0,
        }
    }
}

/// Outcomes pooled for one sampled allocation
#[derive(Debug, Default)]
struct AllocationStats {
    outcomes: Vec<f64>,
    feasible: usize,
    roi_margin_sum: f64,
}

impl AllocationStats {
    fn record(&mut self, acquisitions: f64, feasible: bool, roi_margin: f64) {
        self.outcomes.push(acquisitions);
        if feasible {
            self.feasible += 1;
        }
        self.roi_margin_sum += roi_margin;
    }

    fn draws(&self) -> usize {
        self.outcomes.len()
    }

    fn mean(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().sum::<f64>() / self.outcomes.len() as f64
    }

    fn feasible_share(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.feasible as f64 / self.outcomes.len() as f64
    }

    fn qualifies(&self) -> bool {
        self.feasible_share() >= FEASIBLE_SHARE
    }

    fn mean_roi_margin(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.roi_margin_sum / self.outcomes.len() as f64
    }

    fn percentile(&self, p: f64) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let mut sorted = self.outcomes.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let index = ((p / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }
}

/// Randomized budget allocation search
#[derive(Debug, Clone, Default)]
pub struct ScenarioSimulator {
    constraints: SimulationConstraints,
    config: SimulatorConfig,
}

impl ScenarioSimulator {
    pub fn new(constraints: SimulationConstraints, config: SimulatorConfig) -> Result<Self> {
        constraints.validate()?;
        config.validate()?;
        config.validate_against(&constraints)?;
        Ok(Self { constraints, config })
    }

    pub fn constraints(&self) -> &SimulationConstraints {
        &self.constraints
    }

    /// Copy of this simulator that stops counting acquisitions past `target`
    pub fn with_acquisition_target(&self, target: f64) -> Result<Self> {
        let constraints = SimulationConstraints {
            acquisition_target: Some(target),
            ..self.constraints.clone()
        };
        Self::new(constraints, self.config.clone())
    }

    /// Run with the configured seed, or fresh entropy when none is set
    pub fn run(&self, params: &SimulationParameters) -> Result<SimulationResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(params, &mut rng)
    }

    pub fn run_with_rng<R: Rng>(
        &self,
        params: &SimulationParameters,
        rng: &mut R,
    ) -> Result<SimulationResult> {
        params.validate()?;

        let channels = &params.channels;
        let iterations = self.config.iterations;
        let step = self.config.allocation_step;
        let total_steps = (1.0 / step + 1e-9).floor() as u32;
        let max_steps =
            (self.constraints.max_budget_per_channel_fraction / step + 1e-9).floor() as u32;
        let step_budget = params.budget * step;
        let horizon = self.horizon_days(params);
        let min_roi = self.constraints.min_roi_percent;

        let cost_noise = Perturbation::new(self.config.cost_jitter)?;
        let capacity_noise = Perturbation::new(self.config.capacity_jitter)?;
        let capacities: Vec<f64> = channels
            .iter()
            .map(|c| seasonal_capacity(params, c.monthly_capacity, horizon))
            .collect();

        info!(
            budget = params.budget,
            channels = channels.len(),
            iterations,
            horizon_days = horizon,
            "Starting budget simulation"
        );

        let mut pools: BTreeMap<Vec<u32>, AllocationStats> = BTreeMap::new();
        let mut spend_samples: Vec<Vec<f64>> = vec![Vec::with_capacity(iterations); channels.len()];
        let mut outcome_samples: Vec<f64> = Vec::with_capacity(iterations);

        for _ in 0..iterations {
            let steps = sample_steps(rng, channels.len(), total_steps, max_steps);

            let mut acquisitions = 0.0;
            let mut feasible = true;
            let mut roi_margin = f64::INFINITY;

            for (i, channel) in channels.iter().enumerate() {
                let amount = steps[i] as f64 * step_budget;
                spend_samples[i].push(amount);
                if steps[i] == 0 {
                    continue;
                }

                let cost_factor = cost_noise.sample(rng);
                let capacity_factor = capacity_noise.sample(rng);
                let cost = channel.cost_per_acquisition * cost_factor;
                acquisitions += (amount / cost).min(capacities[i] * capacity_factor);

                // Returns scale inversely with what each acquisition cost
                let roi = channel.roi_percent / cost_factor;
                if roi < min_roi {
                    feasible = false;
                }
                roi_margin = roi_margin.min((roi - min_roi) / min_roi.max(1.0));
            }

            if let Some(target) = self.constraints.acquisition_target {
                acquisitions = acquisitions.min(target);
            }

            outcome_samples.push(acquisitions);
            pools
                .entry(steps)
                .or_default()
                .record(acquisitions, feasible, roi_margin);
        }

        debug!(distinct_allocations = pools.len(), "Pooled sampled allocations");

        let (optimal_key, constraint_status) = self.select_optimal(params, &pools)?;
        let optimal = pools.get(&optimal_key).ok_or_else(|| {
            PlanningError::InvalidParameter("Selected allocation was never sampled".to_string())
        })?;

        let optimal_amounts: Vec<f64> = optimal_key.iter().map(|&s| s as f64 * step_budget).collect();
        let optimal_allocation = allocation_map(channels, &optimal_amounts);

        let spread = if optimal.draws() >= 2 {
            coefficient_of_variation(&optimal.outcomes)
        } else {
            coefficient_of_variation(&outcome_samples)
        };
        let mut risk_level = match spread {
            Ok(cv) if cv < 0.10 => RiskLevel::Low,
            Ok(cv) if cv < 0.25 => RiskLevel::Medium,
            _ => RiskLevel::High,
        };
        if !constraint_status.is_satisfied() || optimal.mean_roi_margin() < THIN_ROI_MARGIN {
            risk_level = RiskLevel::High;
        }

        let alternative_scenarios =
            self.alternatives(channels, &pools, &optimal_key, step_budget, iterations);

        let sensitivity_by_channel = channels
            .iter()
            .zip(&spend_samples)
            .map(|(channel, spend)| {
                let r = pearson_correlation(spend, &outcome_samples).unwrap_or(0.0);
                (channel.id.clone(), r * 100.0)
            })
            .collect();

        let result = SimulationResult {
            optimal_allocation,
            expected_acquisitions: optimal.mean(),
            acquisitions_p10: optimal.percentile(10.0),
            acquisitions_p90: optimal.percentile(90.0),
            optimal_timeline_days: self.optimal_timeline(params, &optimal_amounts, horizon),
            risk_level,
            alternative_scenarios,
            sensitivity_by_channel,
            constraint_status,
            iterations,
        };

        info!(
            expected_acquisitions = result.expected_acquisitions,
            allocated = result.allocated_budget(),
            timeline_days = result.optimal_timeline_days,
            risk = %result.risk_level,
            "Budget simulation finished"
        );

        Ok(result)
    }

    fn horizon_days(&self, params: &SimulationParameters) -> u32 {
        match self.constraints.max_timeframe_days {
            Some(max) => params.timeline_days.min(max),
            None => params.timeline_days,
        }
    }

    /// Best qualifying allocation, or the least-violating one when none qualifies
    fn select_optimal(
        &self,
        params: &SimulationParameters,
        pools: &BTreeMap<Vec<u32>, AllocationStats>,
    ) -> Result<(Vec<u32>, ConstraintStatus)> {
        // An allocation that funds nothing is never a recommendation
        let best = pools
            .iter()
            .filter(|(key, stats)| funds_any(key) && stats.qualifies())
            .max_by(|a, b| a.1.mean().total_cmp(&b.1.mean()));

        if let Some((key, _)) = best {
            return Ok((key.clone(), ConstraintStatus::Satisfied));
        }

        let (key, _) = pools
            .iter()
            .max_by(|a, b| {
                funds_any(a.0)
                    .cmp(&funds_any(b.0))
                    .then(a.1.feasible_share().total_cmp(&b.1.feasible_share()))
                    .then(a.1.mean().total_cmp(&b.1.mean()))
            })
            .ok_or_else(|| {
                PlanningError::InvalidParameter("Simulation produced no samples".to_string())
            })?;

        let violations = self.violations(params, key);
        warn!(
            violations = violations.len(),
            min_roi_percent = self.constraints.min_roi_percent,
            "No allocation satisfied the constraints, returning best effort"
        );

        Ok((key.clone(), ConstraintStatus::Infeasible { violations }))
    }

    fn violations(&self, params: &SimulationParameters, steps: &[u32]) -> Vec<String> {
        if !funds_any(steps) {
            return vec![format!(
                "No {:.0}% budget step could be assigned to any of {} channels",
                self.config.allocation_step * 100.0,
                params.channels.len()
            )];
        }

        let min_roi = self.constraints.min_roi_percent;
        let mut violations: Vec<String> = params
            .channels
            .iter()
            .zip(steps)
            .filter(|(channel, &s)| s > 0 && channel.roi_percent < min_roi)
            .map(|(channel, _)| {
                format!(
                    "Channel {} returns {}% ROI, below the {}% minimum",
                    channel.id, channel.roi_percent, min_roi
                )
            })
            .collect();

        if violations.is_empty() {
            violations.push(format!(
                "No sampled allocation kept every funded channel above {}% ROI in most draws",
                min_roi
            ));
        }
        violations
    }

    fn alternatives(
        &self,
        channels: &[Channel],
        pools: &BTreeMap<Vec<u32>, AllocationStats>,
        optimal_key: &[u32],
        step_budget: f64,
        iterations: usize,
    ) -> Vec<AlternativeScenario> {
        let mut others: Vec<(&Vec<u32>, &AllocationStats)> = pools
            .iter()
            .filter(|(key, _)| key.as_slice() != optimal_key)
            .collect();
        others.sort_by(|a, b| {
            b.1.qualifies()
                .cmp(&a.1.qualifies())
                .then(b.1.mean().total_cmp(&a.1.mean()))
        });

        others
            .into_iter()
            .take(self.config.alternatives)
            .enumerate()
            .map(|(rank, (key, stats))| {
                let amounts: Vec<f64> = key.iter().map(|&s| s as f64 * step_budget).collect();
                AlternativeScenario {
                    name: format!("Alternative {}: {}", rank + 1, mix_name(channels, key)),
                    allocation: allocation_map(channels, &amounts),
                    expected_acquisitions: stats.mean(),
                    probability: stats.draws() as f64 / iterations as f64,
                }
            })
            .collect()
    }

    /// Acquisitions with nominal costs and capacities over `days`
    fn nominal_acquisitions(&self, params: &SimulationParameters, amounts: &[f64], days: u32) -> f64 {
        let total: f64 = params
            .channels
            .iter()
            .zip(amounts)
            .filter(|(_, &amount)| amount > 0.0)
            .map(|(channel, &amount)| {
                (amount / channel.cost_per_acquisition)
                    .min(seasonal_capacity(params, channel.monthly_capacity, days))
            })
            .sum();

        match self.constraints.acquisition_target {
            Some(target) => total.min(target),
            None => total,
        }
    }

    /// Shortest whole number of months reaching the saturation share of the
    /// full-horizon acquisitions
    fn optimal_timeline(&self, params: &SimulationParameters, amounts: &[f64], horizon: u32) -> u32 {
        let full = self.nominal_acquisitions(params, amounts, horizon);
        if full <= 0.0 {
            return horizon;
        }

        let goal = full * self.config.timeline_saturation;
        let mut days = 30;
        while days < horizon {
            if self.nominal_acquisitions(params, amounts, days) >= goal - 1e-9 {
                return days;
            }
            days += 30;
        }
        horizon
    }
}

fn funds_any(steps: &[u32]) -> bool {
    steps.iter().any(|&s| s > 0)
}

/// Random split of `total_steps` budget steps, each channel capped at `max_steps`
fn sample_steps<R: Rng>(rng: &mut R, channels: usize, total_steps: u32, max_steps: u32) -> Vec<u32> {
    let weights: Vec<f64> = (0..channels).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = weights.iter().sum();

    weights
        .iter()
        .map(|w| {
            let share = if total > 0.0 { w / total } else { 1.0 / channels as f64 };
            ((share * total_steps as f64).floor() as u32).min(max_steps)
        })
        .collect()
}

/// Channel capacity over `days`, scaled by the average multiplier of the months spanned
fn seasonal_capacity(params: &SimulationParameters, monthly_capacity: f64, days: u32) -> f64 {
    let months_spanned = ((days as f64 / 30.0).ceil() as usize).max(1);
    let first = (params.start_month.saturating_sub(1)) as usize;
    let multiplier = (0..months_spanned)
        .map(|k| params.seasonality_multipliers[(first + k) % 12])
        .sum::<f64>()
        / months_spanned as f64;

    monthly_capacity * (days as f64 / 30.0) * multiplier
}

fn allocation_map(channels: &[Channel], amounts: &[f64]) -> BTreeMap<String, f64> {
    channels
        .iter()
        .zip(amounts)
        .map(|(channel, &amount)| (channel.id.clone(), amount))
        .collect()
}

fn mix_name(channels: &[Channel], steps: &[u32]) -> String {
    let lead = steps
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > 0)
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)));

    match lead {
        Some((i, _)) => format!("{}-led mix", channels[i].id),
        None => "unfunded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_steps_respect_caps() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let steps = sample_steps(&mut rng, 4, 20, 8);
            assert!(steps.iter().sum::<u32>() <= 20);
            assert!(steps.iter().all(|&s| s <= 8));
        }
    }

    #[test]
    fn single_channel_gets_the_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_steps(&mut rng, 1, 20, 8), vec![8]);
    }

    #[test]
    fn seasonal_capacity_wraps_the_year() {
        let mut multipliers = [1.0; 12];
        multipliers[11] = 2.0;
        let params = SimulationParameters::new(1.0, 60, vec![Channel::new("a", 1.0, 1.0, 1.0)])
            .with_seasonality(multipliers, 12);

        // December (2.0) then January (1.0) over two months
        let capacity = seasonal_capacity(&params, 10.0, 60);
        assert!((capacity - 30.0).abs() < 1e-9);
    }

    #[test]
    fn percentile_of_pool() {
        let mut stats = AllocationStats::default();
        for v in 1..=11 {
            stats.record(v as f64, true, 1.0);
        }
        assert_eq!(stats.percentile(10.0), 2.0);
        assert_eq!(stats.percentile(90.0), 10.0);
        assert_eq!(stats.mean(), 6.0);
    }

    #[test]
    fn mix_name_prefers_the_largest_share() {
        let channels = vec![Channel::new("a", 1.0, 1.0, 1.0), Channel::new("b", 1.0, 1.0, 1.0)];
        assert_eq!(mix_name(&channels, &[2, 5]), "b-led mix");
        assert_eq!(mix_name(&channels, &[0, 0]), "unfunded");
    }
}
