//! Weekday demand pattern extraction

use crate::config::SeasonalityConfig;
use crate::confidence::ConfidenceLabel;
use crate::data::Observation;
use crate::error::{ForecastError, Result};
use chrono::{Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Weekdays in bucket order (Monday first)
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Average demand observed on one weekday
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub average_count: f64,
    pub average_value: f64,
    /// Observations that fell into this bucket. Zero means "no data", not
    /// "no demand".
    pub samples: usize,
}

/// Where a pattern's numbers come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSource {
    Observed,
    /// No history was available; every average is zero
    Fallback,
}

/// Average demand per weekday over a history window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPattern {
    weekdays: [WeekdayAverage; 7],
    confidence: f64,
    samples_analyzed: usize,
    source: PatternSource,
}

impl WeekdayPattern {
    /// Pattern returned when there is no history to learn from
    pub fn fallback() -> Self {
        Self {
            weekdays: WEEKDAYS.map(|weekday| WeekdayAverage {
                weekday,
                average_count: 0.0,
                average_value: 0.0,
                samples: 0,
            }),
            confidence: 0.0,
            samples_analyzed: 0,
            source: PatternSource::Fallback,
        }
    }

    pub fn for_weekday(&self, weekday: Weekday) -> &WeekdayAverage {
        &self.weekdays[weekday.num_days_from_monday() as usize]
    }

    pub fn weekdays(&self) -> &[WeekdayAverage; 7] {
        &self.weekdays
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn confidence_label(&self) -> ConfidenceLabel {
        ConfidenceLabel::from_score(self.confidence)
    }

    pub fn samples_analyzed(&self) -> usize {
        self.samples_analyzed
    }

    pub fn source(&self) -> PatternSource {
        self.source
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PatternSource::Fallback
    }
}

/// Reduces a history window to one average per weekday
#[derive(Debug, Clone, Default)]
pub struct WeekdaySeasonalityAnalyzer {
    config: SeasonalityConfig,
}

impl WeekdaySeasonalityAnalyzer {
    pub fn new(config: SeasonalityConfig) -> Self {
        Self { config }
    }

    /// Half-open `[start, end)` range of the trailing window ending before
    /// `as_of`. The day `as_of` itself is still accumulating and excluded.
    pub fn trailing_window(&self, as_of: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let start = as_of
            .checked_sub_months(Months::new(self.config.window_months))
            .ok_or_else(|| ForecastError::DataError(format!("Window start before {} out of range", as_of)))?;
        Ok((start, as_of))
    }

    /// Analyze only the observations inside the trailing window of `as_of`
    pub fn analyze_as_of(&self, observations: &[Observation], as_of: NaiveDate) -> Result<WeekdayPattern> {
        let (start, end) = self.trailing_window(as_of)?;
        let window: Vec<Observation> = observations
            .iter()
            .filter(|o| o.date >= start && o.date < end)
            .copied()
            .collect();
        Ok(self.analyze(&window))
    }

    /// Average count and value per weekday.
    ///
    /// Confidence depends on the total sample count, not on per-bucket counts.
    /// An empty input yields [`WeekdayPattern::fallback`].
    pub fn analyze(&self, observations: &[Observation]) -> WeekdayPattern {
        if observations.is_empty() {
            warn!("No historical observations for weekday pattern, using fallback");
            return WeekdayPattern::fallback();
        }

        let mut counts = [0.0_f64; 7];
        let mut values = [0.0_f64; 7];
        let mut samples = [0_usize; 7];
        for obs in observations {
            let idx = obs.weekday().num_days_from_monday() as usize;
            counts[idx] += f64::from(obs.service_count);
            values[idx] += obs.monetary_value;
            samples[idx] += 1;
        }

        let weekdays = WEEKDAYS.map(|weekday| {
            let idx = weekday.num_days_from_monday() as usize;
            let n = samples[idx];
            let (average_count, average_value) = if n == 0 {
                (0.0, 0.0)
            } else {
                (counts[idx] / n as f64, values[idx] / n as f64)
            };
            WeekdayAverage {
                weekday,
                average_count,
                average_value,
                samples: n,
            }
        });

        let samples_analyzed = observations.len();
        let confidence = if samples_analyzed >= self.config.high_confidence_min_samples {
            self.config.high_confidence
        } else {
            self.config.low_confidence
        };

        debug!(samples_analyzed, confidence, "Weekday pattern computed");

        WeekdayPattern {
            weekdays,
            confidence,
            samples_analyzed,
            source: PatternSource::Observed,
        }
    }
}
