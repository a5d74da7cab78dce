use approx::assert_abs_diff_eq;
use capacity_planner::{
    CapacityDeficitCalculator, PlannerConfig, PlanningError, Segment, StaticZoneMetrics,
    ZoneDemandMetric, ZoneMetricsProvider,
};
use rstest::rstest;

struct OfflineMetrics;

impl ZoneMetricsProvider for OfflineMetrics {
    fn zone_metrics(&self) -> capacity_planner::Result<Vec<ZoneDemandMetric>> {
        Err(PlanningError::UpstreamUnavailable("metrics store timed out".to_string()))
    }
}

#[test]
fn test_idle_zone_is_not_at_risk() {
    let calculator = CapacityDeficitCalculator::default();
    let assessment = calculator
        .assess(&ZoneDemandMetric::new("quiet", 10, 0.0).unwrap())
        .unwrap();

    assert_eq!(assessment.deficit.deficit_local, 0.0);
    assert_eq!(assessment.deficit.deficit_longhaul, 0.0);
    assert_eq!(assessment.deficit.deficit_express, 0.0);
    assert_eq!(assessment.deficit.deficit_total, 0.0);
    assert!(assessment.urgency.value() < 7);
    assert!(!assessment.at_risk);
}

#[rstest]
#[case(0, 0.0)]
#[case(0, 25.0)]
#[case(5, 120.0)]
#[case(40, 60.0)]
#[case(250, 10.0)]
fn test_segment_deficits_sum_to_total(#[case] units: u32, #[case] volume: f64) {
    let analysis = CapacityDeficitCalculator::default()
        .analyze(&ZoneDemandMetric::new("z", units, volume).unwrap())
        .unwrap();

    assert_abs_diff_eq!(
        analysis.deficit_total,
        analysis.deficit_local + analysis.deficit_longhaul + analysis.deficit_express,
        epsilon = 1e-9
    );
    for segment in Segment::ALL {
        let figure = analysis.segment(segment).unwrap();
        assert!(figure.deficit >= 0.0);
        assert!(figure.deficit <= figure.demand + 1e-9);
    }
}

#[test]
fn test_urgency_is_bounded_and_monotonic_in_deficit() {
    let calculator = CapacityDeficitCalculator::default();
    let mut previous = 0;
    for step in 0..=60 {
        let deficit = step as f64;
        let score = calculator.urgency_score(deficit, 50.0, 8).value();
        assert!(score <= 10);
        assert!(score >= previous, "score fell from {} to {} at deficit {}", previous, score, deficit);
        previous = score;
    }
    assert_eq!(previous, 10);
}

#[test]
fn test_understaffed_zone_is_flagged() {
    let calculator = CapacityDeficitCalculator::default();
    // 5 units against 120 services a day leaves most demand unserved
    let assessment = calculator
        .assess(&ZoneDemandMetric::new("busy", 5, 120.0).unwrap())
        .unwrap();

    assert!(assessment.deficit.deficit_total > 80.0);
    assert!(assessment.at_risk);
    assert!(assessment.deficit.unit_shortfall() > 70.0);
}

#[test]
fn test_zones_are_ranked_by_urgency() {
    let provider = StaticZoneMetrics::new(vec![
        ZoneDemandMetric::new("calm", 50, 20.0).unwrap(),
        ZoneDemandMetric::new("swamped", 2, 90.0).unwrap(),
        ZoneDemandMetric::new("tight", 20, 30.0).unwrap(),
    ]);

    let assessments = CapacityDeficitCalculator::default()
        .assess_provider(&provider)
        .unwrap();

    let order: Vec<&str> = assessments.iter().map(|a| a.metric.zone_id.as_str()).collect();
    assert_eq!(order[0], "swamped");
    assert!(assessments
        .windows(2)
        .all(|w| w[0].urgency >= w[1].urgency));
}

#[test]
fn test_provider_failure_propagates() {
    let err = CapacityDeficitCalculator::default()
        .assess_provider(&OfflineMetrics)
        .unwrap_err();
    assert!(matches!(err, PlanningError::UpstreamUnavailable(_)));
}

#[test]
fn test_custom_rejection_ratio_changes_capacity() {
    let config = PlannerConfig::from_json(r#"{ "capacity": { "rejection_ratio": 0.0, "segment_efficiency": 1.0 } }"#)
        .unwrap();
    let calculator = CapacityDeficitCalculator::new(config.capacity, config.urgency).unwrap();
    let analysis = calculator
        .analyze(&ZoneDemandMetric::new("z", 10, 0.0).unwrap())
        .unwrap();
    assert_abs_diff_eq!(analysis.effective_capacity, 10.0, epsilon = 1e-12);
}
