use approx::assert_abs_diff_eq;
use chrono::{Datelike, NaiveDate, Weekday};
use demand_forecast::seasonality::WEEKDAYS;
use demand_forecast::{
    ConfidenceLabel, Observation, SeasonalProjector, WeekdayPattern, WeekdaySeasonalityAnalyzer,
};
use rstest::rstest;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn constant_history(start: NaiveDate, days: usize, count: u32, value: f64) -> Vec<Observation> {
    start
        .iter_days()
        .take(days)
        .map(|d| Observation::new(d, count, value).unwrap())
        .collect()
}

#[test]
fn test_ninety_identical_days_give_a_confident_flat_pattern() {
    let history = constant_history(day(2024, 2, 1), 90, 50, 300_000.0);
    let pattern = WeekdaySeasonalityAnalyzer::default().analyze(&history);

    assert_eq!(pattern.samples_analyzed(), 90);
    assert_eq!(pattern.confidence_label(), ConfidenceLabel::High);
    for weekday in WEEKDAYS {
        let bucket = pattern.for_weekday(weekday);
        assert_abs_diff_eq!(bucket.average_count, 50.0);
        assert_abs_diff_eq!(bucket.average_value, 300_000.0);
    }
}

#[rstest]
#[case(29, 0.6)]
#[case(30, 0.85)]
#[case(1, 0.6)]
fn test_confidence_steps_on_total_samples(#[case] days: usize, #[case] expected: f64) {
    let history = constant_history(day(2024, 1, 1), days, 3, 10.0);
    let pattern = WeekdaySeasonalityAnalyzer::default().analyze(&history);
    assert_eq!(pattern.confidence(), expected);
}

#[test]
fn test_averages_are_never_negative_and_empty_buckets_are_zero() {
    // Only weekdays: Saturdays and Sundays stay empty
    let history: Vec<Observation> = constant_history(day(2024, 1, 1), 35, 7, 700.0)
        .into_iter()
        .filter(|o| !matches!(o.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();
    let pattern = WeekdaySeasonalityAnalyzer::default().analyze(&history);

    for bucket in pattern.weekdays() {
        assert!(bucket.average_count >= 0.0);
        assert!(bucket.average_value >= 0.0);
    }
    let saturday = pattern.for_weekday(Weekday::Sat);
    assert_eq!((saturday.average_count, saturday.average_value, saturday.samples), (0.0, 0.0, 0));
    // 25 weekday samples: below 30 regardless of any single bucket
    assert_eq!(pattern.confidence(), 0.6);
}

#[test]
fn test_month_end_projection_with_momentum() {
    let pattern = WeekdaySeasonalityAnalyzer::default()
        .analyze(&constant_history(day(2024, 3, 1), 90, 12, 70_000.0));

    // Ten days at 100k against an expected 70k per day
    let mtd = constant_history(day(2024, 6, 1), 10, 15, 100_000.0);
    let projection = SeasonalProjector::default()
        .project(&pattern, &mtd, day(2024, 6, 11))
        .unwrap();

    assert_eq!(projection.days_elapsed, 10);
    assert_eq!(projection.per_day_breakdown.len(), 20);
    assert_abs_diff_eq!(projection.month_to_date_actual_value, 1_000_000.0, epsilon = 1e-6);
    assert!(projection.momentum_applied);
    assert!(projection.projected_remaining_value >= 1_400_000.0);
    assert_abs_diff_eq!(projection.total_projected_value, 2_400_000.0 * 1.05, epsilon = 1.0);
    assert_eq!(projection.confidence_label, ConfidenceLabel::High);
}

#[rstest]
#[case(day(2024, 6, 11))]
#[case(day(2024, 6, 1))]
#[case(day(2024, 6, 30))]
#[case(day(2024, 2, 29))]
fn test_total_is_actual_plus_breakdown(#[case] reference: NaiveDate) {
    let pattern = WeekdaySeasonalityAnalyzer::default()
        .analyze(&constant_history(day(2024, 1, 1), 60, 9, 12_345.67));
    let mtd = constant_history(reference.with_day(1).unwrap(), 31, 11, 23_456.78);

    let projection = SeasonalProjector::default()
        .project(&pattern, &mtd, reference)
        .unwrap();

    let breakdown_sum: f64 = projection
        .per_day_breakdown
        .iter()
        .map(|d| d.projected_value)
        .sum();
    assert!(
        (projection.total_projected_value - (projection.month_to_date_actual_value + breakdown_sum)).abs()
            <= 1.0
    );
    assert_abs_diff_eq!(
        projection.weekday_subtotal + projection.weekend_subtotal,
        breakdown_sum,
        epsilon = 1e-6
    );
}

#[test]
fn test_medium_confidence_with_short_history() {
    let pattern = WeekdaySeasonalityAnalyzer::default()
        .analyze(&constant_history(day(2024, 4, 1), 20, 9, 1_000.0));
    let mtd = constant_history(day(2024, 5, 1), 9, 9, 1_000.0);

    let projection = SeasonalProjector::default()
        .project(&pattern, &mtd, day(2024, 5, 10))
        .unwrap();

    assert_eq!(projection.confidence_label, ConfidenceLabel::Medium);
}

#[test]
fn test_fallback_projection_is_labelled() {
    let projection = SeasonalProjector::default()
        .project(&WeekdayPattern::fallback(), &[], day(2024, 6, 11))
        .unwrap();

    assert!(projection.is_fallback);
    assert_eq!(projection.confidence_label, ConfidenceLabel::Low);
    assert!(projection.methodology_note.contains("fallback"));
}

#[test]
fn test_unseen_weekend_is_projected_from_observed_weekdays() {
    // Weekday-only history: Saturday and Sunday buckets are empty
    let history: Vec<Observation> = constant_history(day(2024, 4, 1), 60, 10, 1_000.0)
        .into_iter()
        .filter(|o| !matches!(o.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();
    let pattern = WeekdaySeasonalityAnalyzer::default().analyze(&history);
    assert_eq!(pattern.confidence(), 0.85);

    // June 2024 starts on a Saturday; every elapsed day matches the weekday average
    let mtd = constant_history(day(2024, 6, 1), 10, 10, 1_000.0);
    let projection = SeasonalProjector::default()
        .project(&pattern, &mtd, day(2024, 6, 11))
        .unwrap();

    assert_eq!(projection.unseen_weekdays, vec![Weekday::Sat, Weekday::Sun]);
    assert!(!projection.momentum_applied);
    // 15, 16, 22, 23, 29 and 30 June
    assert_abs_diff_eq!(projection.weekend_subtotal, 6_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(projection.total_projected_value, 30_000.0, epsilon = 1e-6);
    assert_eq!(projection.confidence_label, ConfidenceLabel::Medium);
    assert!(projection.methodology_note.contains("no history for Sat, Sun"));
}
