//! Month-end projection from a weekday pattern

use crate::config::ProjectionConfig;
use crate::confidence::ConfidenceLabel;
use crate::data::Observation;
use crate::error::{ForecastError, Result};
use crate::seasonality::WeekdayPattern;
use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Projected value for one remaining day of the month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProjection {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub projected_value: f64,
    pub is_weekend: bool,
}

/// Full-month projection for the month containing the reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProjection {
    pub month_to_date_actual_value: f64,
    pub projected_remaining_value: f64,
    pub total_projected_value: f64,
    pub per_day_breakdown: Vec<DailyProjection>,
    pub weekday_subtotal: f64,
    pub weekend_subtotal: f64,
    pub confidence_label: ConfidenceLabel,
    pub methodology_note: String,
    /// Calendar days of the month before the reference date
    pub days_elapsed: u32,
    pub momentum_applied: bool,
    /// Weekdays without history, projected at the mean of the observed weekdays
    pub unseen_weekdays: Vec<Weekday>,
    /// True when no history existed and fixed daily values were used
    pub is_fallback: bool,
}

/// Extends a partially elapsed month to a full-month projection
#[derive(Debug, Clone, Default)]
pub struct SeasonalProjector {
    config: ProjectionConfig,
}

impl SeasonalProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Project the month containing `reference_date`.
    ///
    /// Data is one day behind: everything strictly before `reference_date`
    /// counts as actuals, and every day from `reference_date` through the end
    /// of the month is projected from the weekday pattern. Observations
    /// outside that month-to-date range are ignored.
    pub fn project(
        &self,
        pattern: &WeekdayPattern,
        month_to_date: &[Observation],
        reference_date: NaiveDate,
    ) -> Result<SeasonalProjection> {
        let month_start = first_of_month(reference_date)?;
        let month_end = last_of_month(reference_date)?;

        let elapsed: Vec<&Observation> = month_to_date
            .iter()
            .filter(|o| o.date >= month_start && o.date < reference_date)
            .collect();
        let actual: f64 = elapsed.iter().map(|o| o.monetary_value).sum();
        let days_with_data = elapsed.iter().map(|o| o.date).collect::<BTreeSet<_>>().len();
        let days_elapsed = (reference_date - month_start).num_days() as u32;

        let remaining_days: Vec<NaiveDate> = reference_date
            .iter_days()
            .take_while(|d| *d <= month_end)
            .collect();

        if pattern.samples_analyzed() == 0 {
            warn!(%reference_date, "No weekday history, projecting with fallback daily value");
            return Ok(self.fallback_projection(actual, &remaining_days, days_elapsed));
        }

        // An empty bucket means no data for that weekday, not zero demand
        let observed: Vec<f64> = pattern
            .weekdays()
            .iter()
            .filter(|w| w.samples > 0)
            .map(|w| w.average_value)
            .collect();
        let unseen_weekdays: Vec<Weekday> = pattern
            .weekdays()
            .iter()
            .filter(|w| w.samples == 0)
            .map(|w| w.weekday)
            .collect();
        let substitute_value = if observed.is_empty() {
            self.config.fallback_daily_value
        } else {
            observed.iter().sum::<f64>() / observed.len() as f64
        };
        let is_seen = |weekday: Weekday| pattern.for_weekday(weekday).samples > 0;
        let daily_value = |weekday: Weekday| {
            if is_seen(weekday) {
                pattern.for_weekday(weekday).average_value
            } else {
                substitute_value
            }
        };

        let mut breakdown: Vec<DailyProjection> = remaining_days
            .iter()
            .map(|&date| daily(date, daily_value(date.weekday())))
            .collect();

        // Momentum compares only weekdays the pattern has history for
        let expected_elapsed: f64 = month_start
            .iter_days()
            .take_while(|d| *d < reference_date)
            .filter(|d| is_seen(d.weekday()))
            .map(|d| pattern.for_weekday(d.weekday()).average_value)
            .sum();
        let comparable_actual: f64 = elapsed
            .iter()
            .filter(|o| is_seen(o.date.weekday()))
            .map(|o| o.monetary_value)
            .sum();

        let base_remaining: f64 = breakdown.iter().map(|d| d.projected_value).sum();
        let outperforming = expected_elapsed > 0.0
            && comparable_actual > expected_elapsed * (1.0 + self.config.momentum_threshold);
        let momentum_applied = outperforming && base_remaining > 0.0;

        if momentum_applied {
            // Scale the remaining days so that actual + remaining equals the
            // boosted total exactly.
            let boosted_total = (actual + base_remaining) * self.config.momentum_multiplier;
            let scale = (boosted_total - actual) / base_remaining;
            for day in &mut breakdown {
                day.projected_value *= scale;
            }
        }

        let projected_remaining_value: f64 = breakdown.iter().map(|d| d.projected_value).sum();
        let (weekday_subtotal, weekend_subtotal) = subtotals(&breakdown);

        let mut confidence_label =
            self.confidence_label(pattern.confidence(), days_with_data, days_elapsed);
        if !unseen_weekdays.is_empty() && confidence_label == ConfidenceLabel::High {
            confidence_label = ConfidenceLabel::Medium;
        }

        let mut methodology_note = format!(
            "Actuals through {} plus {} projected days at weekday averages from {} historical samples",
            reference_date.pred_opt().unwrap_or(reference_date),
            breakdown.len(),
            pattern.samples_analyzed()
        );
        if !unseen_weekdays.is_empty() {
            let names: Vec<String> = unseen_weekdays.iter().map(|w| w.to_string()).collect();
            methodology_note.push_str(&format!(
                "; no history for {}, substituted the observed weekday mean of {:.0}",
                names.join(", "),
                substitute_value
            ));
        }
        if momentum_applied {
            methodology_note.push_str(&format!(
                "; momentum x{:.2} applied (month-to-date {:.0} vs expected {:.0})",
                self.config.momentum_multiplier, comparable_actual, expected_elapsed
            ));
        }

        debug!(
            actual,
            projected_remaining_value,
            momentum_applied,
            %confidence_label,
            "Seasonal projection computed"
        );

        Ok(SeasonalProjection {
            month_to_date_actual_value: actual,
            projected_remaining_value,
            total_projected_value: actual + projected_remaining_value,
            per_day_breakdown: breakdown,
            weekday_subtotal,
            weekend_subtotal,
            confidence_label,
            methodology_note,
            days_elapsed,
            momentum_applied,
            unseen_weekdays,
            is_fallback: false,
        })
    }

    fn confidence_label(&self, pattern_confidence: f64, days_with_data: usize, days_elapsed: u32) -> ConfidenceLabel {
        if pattern_confidence > self.config.high_confidence_threshold
            && days_with_data >= self.config.high_confidence_min_days
        {
            ConfidenceLabel::High
        } else if pattern_confidence < self.config.low_confidence_threshold
            || days_elapsed < self.config.low_confidence_min_days
        {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::Medium
        }
    }

    fn fallback_projection(&self, actual: f64, remaining_days: &[NaiveDate], days_elapsed: u32) -> SeasonalProjection {
        let breakdown: Vec<DailyProjection> = remaining_days
            .iter()
            .map(|&date| daily(date, self.config.fallback_daily_value))
            .collect();
        let projected_remaining_value: f64 = breakdown.iter().map(|d| d.projected_value).sum();
        let (weekday_subtotal, weekend_subtotal) = subtotals(&breakdown);

        SeasonalProjection {
            month_to_date_actual_value: actual,
            projected_remaining_value,
            total_projected_value: actual + projected_remaining_value,
            per_day_breakdown: breakdown,
            weekday_subtotal,
            weekend_subtotal,
            confidence_label: ConfidenceLabel::Low,
            methodology_note: format!(
                "Insufficient history: fixed fallback of {:.0} per remaining day",
                self.config.fallback_daily_value
            ),
            days_elapsed,
            momentum_applied: false,
            unseen_weekdays: Vec::new(),
            is_fallback: true,
        }
    }
}

fn daily(date: NaiveDate, projected_value: f64) -> DailyProjection {
    let weekday = date.weekday();
    DailyProjection {
        date,
        weekday,
        projected_value,
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
    }
}

fn subtotals(breakdown: &[DailyProjection]) -> (f64, f64) {
    breakdown.iter().fold((0.0, 0.0), |(weekday, weekend), day| {
        if day.is_weekend {
            (weekday, weekend + day.projected_value)
        } else {
            (weekday + day.projected_value, weekend)
        }
    })
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .ok_or_else(|| ForecastError::DataError(format!("No first day for month of {}", date)))
}

fn last_of_month(date: NaiveDate) -> Result<NaiveDate> {
    first_of_month(date)?
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| ForecastError::DataError(format!("No last day for month of {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonality::WeekdaySeasonalityAnalyzer;
    use approx::assert_abs_diff_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_pattern(daily_value: f64, days: usize) -> WeekdayPattern {
        let history: Vec<Observation> = day(2024, 1, 1)
            .iter_days()
            .take(days)
            .map(|d| Observation::new(d, 10, daily_value).unwrap())
            .collect();
        WeekdaySeasonalityAnalyzer::default().analyze(&history)
    }

    #[test]
    fn projects_remaining_days_without_momentum() {
        let pattern = flat_pattern(1_000.0, 60);
        let mtd: Vec<Observation> = (1..=4)
            .map(|d| Observation::new(day(2024, 4, d), 10, 1_000.0).unwrap())
            .collect();

        let projection = SeasonalProjector::default()
            .project(&pattern, &mtd, day(2024, 4, 5))
            .unwrap();

        assert_eq!(projection.per_day_breakdown.len(), 26);
        assert!(!projection.momentum_applied);
        assert_abs_diff_eq!(projection.projected_remaining_value, 26_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(projection.total_projected_value, 30_000.0, epsilon = 1e-6);
        // Four elapsed days is too early to trust
        assert_eq!(projection.confidence_label, ConfidenceLabel::Low);
    }

    #[test]
    fn first_of_month_has_no_actuals() {
        let pattern = flat_pattern(500.0, 60);
        let projection = SeasonalProjector::default()
            .project(&pattern, &[], day(2024, 2, 1))
            .unwrap();

        assert_eq!(projection.days_elapsed, 0);
        assert_eq!(projection.per_day_breakdown.len(), 29);
        assert_eq!(projection.month_to_date_actual_value, 0.0);
    }

    #[test]
    fn weekend_and_weekday_subtotals_split_the_remainder() {
        let pattern = flat_pattern(100.0, 60);
        let projection = SeasonalProjector::default()
            .project(&pattern, &[], day(2024, 6, 24))
            .unwrap();

        // 2024-06-24 (Mon) .. 2024-06-30 (Sun)
        assert_abs_diff_eq!(projection.weekday_subtotal, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projection.weekend_subtotal, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn fallback_when_pattern_is_empty() {
        let projection = SeasonalProjector::default()
            .project(&WeekdayPattern::fallback(), &[], day(2024, 6, 21))
            .unwrap();

        assert!(projection.is_fallback);
        assert_eq!(projection.confidence_label, ConfidenceLabel::Low);
        assert_abs_diff_eq!(projection.projected_remaining_value, 10.0 * 50_000.0);
    }
}
