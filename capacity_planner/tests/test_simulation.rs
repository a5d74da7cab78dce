use capacity_planner::{
    Channel, ConstraintStatus, PlanningError, RiskLevel, ScenarioSimulator, SimulationConstraints,
    SimulationParameters, SimulatorConfig,
};
use pretty_assertions::assert_eq;

fn simulator(seed: u64, iterations: usize) -> ScenarioSimulator {
    let config = SimulatorConfig {
        iterations,
        ..SimulatorConfig::default()
    }
    .with_seed(seed);
    ScenarioSimulator::new(SimulationConstraints::default(), config).unwrap()
}

fn healthy_channels() -> Vec<Channel> {
    vec![
        Channel::new("referral", 250.0, 15.0, 450.0),
        Channel::new("job_board", 400.0, 60.0, 320.0),
        Channel::new("social", 180.0, 25.0, 500.0),
    ]
}

#[test]
fn test_allocation_never_exceeds_budget_or_channel_cap() {
    let budget = 50_000.0;
    let params = SimulationParameters::new(budget, 120, healthy_channels());
    let result = simulator(42, 2_000).run(&params).unwrap();

    let mut allocations = vec![result.optimal_allocation.clone()];
    allocations.extend(result.alternative_scenarios.iter().map(|a| a.allocation.clone()));

    for allocation in allocations {
        let total: f64 = allocation.values().sum();
        assert!(total <= budget + 1e-6, "allocated {} of {}", total, budget);
        for amount in allocation.values() {
            assert!(*amount >= 0.0);
            assert!(*amount <= 0.4 * budget + 1e-6);
        }
    }
    assert_eq!(result.constraint_status, ConstraintStatus::Satisfied);
    assert!(result.expected_acquisitions > 0.0);
    assert!(result.acquisitions_p10 <= result.acquisitions_p90);
}

#[test]
fn test_low_roi_channel_is_reported_infeasible() {
    let params = SimulationParameters::new(
        20_000.0,
        90,
        vec![Channel::new("print_ads", 500.0, 50.0, 100.0)],
    );
    let result = simulator(7, 500).run(&params).unwrap();

    match &result.constraint_status {
        ConstraintStatus::Infeasible { violations } => {
            assert!(!violations.is_empty());
            assert!(violations[0].contains("print_ads"));
        }
        other => panic!("expected infeasible, got {:?}", other),
    }
    // Best effort allocation is still returned
    assert_eq!(result.optimal_allocation.len(), 1);
    assert!(result.allocated_budget() > 0.0);
    assert_eq!(result.risk_level, RiskLevel::High);
}

#[test]
fn test_same_seed_same_result() {
    let params = SimulationParameters::new(30_000.0, 180, healthy_channels());
    let first = simulator(2024, 1_000).run(&params).unwrap();
    let second = simulator(2024, 1_000).run(&params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sensitivity_covers_every_channel_within_bounds() {
    let params = SimulationParameters::new(30_000.0, 90, healthy_channels());
    let result = simulator(11, 1_500).run(&params).unwrap();

    assert_eq!(result.sensitivity_by_channel.len(), 3);
    for value in result.sensitivity_by_channel.values() {
        assert!((-100.0..=100.0).contains(value));
    }

    let probability: f64 = result.alternative_scenarios.iter().map(|a| a.probability).sum();
    assert!(probability <= 1.0);
    assert!(result.alternative_scenarios.len() <= 3);
}

#[test]
fn test_spend_bound_channel_saturates_in_first_month() {
    // 4,000 buys 40 hires; the channel could deliver 1,000 a month
    let params = SimulationParameters::new(10_000.0, 180, vec![Channel::new("agency", 100.0, 1_000.0, 400.0)]);
    let result = simulator(3, 200).run(&params).unwrap();
    assert_eq!(result.optimal_timeline_days, 30);
}

#[test]
fn test_capacity_bound_channel_needs_the_full_horizon() {
    let params = SimulationParameters::new(10_000.0, 180, vec![Channel::new("agency", 100.0, 1.0, 400.0)]);
    let result = simulator(3, 200).run(&params).unwrap();
    assert_eq!(result.optimal_timeline_days, 180);
}

#[test]
fn test_acquisition_target_caps_expectation() {
    let params = SimulationParameters::new(100_000.0, 90, healthy_channels());
    let result = simulator(5, 500)
        .with_acquisition_target(12.0)
        .unwrap()
        .run(&params)
        .unwrap();
    assert!(result.expected_acquisitions <= 12.0);
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let err = simulator(1, 10)
        .run(&SimulationParameters::new(0.0, 90, healthy_channels()))
        .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidParameter(_)));

    let err = simulator(1, 10)
        .run(&SimulationParameters::new(1_000.0, 90, vec![]))
        .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidParameter(_)));
}

#[test]
fn test_channel_cap_below_one_step_is_rejected() {
    let constraints = SimulationConstraints {
        max_budget_per_channel_fraction: 0.03,
        ..SimulationConstraints::default()
    };
    let err = ScenarioSimulator::new(constraints, SimulatorConfig::default()).unwrap_err();
    assert!(matches!(err, PlanningError::InvalidParameter(_)));
}

#[test]
fn test_unfunded_allocation_is_never_satisfied() {
    // A single whole-budget step never fits a share below 1, so every draw funds nothing
    let constraints = SimulationConstraints {
        max_budget_per_channel_fraction: 1.0,
        ..SimulationConstraints::default()
    };
    let config = SimulatorConfig {
        iterations: 200,
        allocation_step: 1.0,
        ..SimulatorConfig::default()
    }
    .with_seed(9);
    let simulator = ScenarioSimulator::new(constraints, config).unwrap();
    let params = SimulationParameters::new(10_000.0, 90, healthy_channels()[..2].to_vec());

    let result = simulator.run(&params).unwrap();

    assert_eq!(result.allocated_budget(), 0.0);
    assert_eq!(result.risk_level, RiskLevel::High);
    match &result.constraint_status {
        ConstraintStatus::Infeasible { violations } => {
            assert!(violations[0].contains("could be assigned to any of 2 channels"));
        }
        other => panic!("expected infeasible, got {:?}", other),
    }
}
