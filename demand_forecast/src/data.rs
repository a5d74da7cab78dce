//! Historical service data: the strict types the engine computes on, the
//! provider boundary, and normalization of loosely shaped source records.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Services completed on one calendar day and what they were worth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub service_count: u32,
    pub monetary_value: f64,
}

impl Observation {
    /// Create an observation, rejecting negative or non-finite values
    pub fn new(date: NaiveDate, service_count: u32, monetary_value: f64) -> Result<Self> {
        if !monetary_value.is_finite() || monetary_value < 0.0 {
            return Err(ForecastError::DataError(format!(
                "Monetary value on {} must be a non-negative number, got {}",
                date, monetary_value
            )));
        }

        Ok(Self {
            date,
            service_count,
            monetary_value,
        })
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// First day of the month
    pub period_start: NaiveDate,
    /// `YYYY-MM`
    pub label: String,
    pub service_count: u64,
    pub monetary_value: f64,
}

impl PeriodTotal {
    pub fn month(year: i32, month: u32, service_count: u64, monetary_value: f64) -> Result<Self> {
        let period_start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ForecastError::DataError(format!("Invalid month {}-{:02}", year, month))
        })?;

        Ok(Self {
            period_start,
            label: format!("{}-{:02}", year, month),
            service_count,
            monetary_value,
        })
    }

    /// First day of the following month
    pub fn next_period_start(&self) -> Result<NaiveDate> {
        self.period_start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ForecastError::DataError("Date out of range".to_string()))
    }
}

/// Read-only source of daily history, implemented by the storage layer
pub trait HistoricalSeriesProvider {
    /// Observations with `start <= date < end`, ordered by date.
    ///
    /// Failures to reach the underlying store are reported as
    /// [`ForecastError::UpstreamUnavailable`].
    fn observations(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>>;
}

/// Provider over an in-memory, date-ordered series
#[derive(Debug, Clone, Default)]
pub struct InMemorySeries {
    observations: Vec<Observation>,
}

impl InMemorySeries {
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl HistoricalSeriesProvider for InMemorySeries {
    fn observations(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>> {
        Ok(self
            .observations
            .iter()
            .filter(|o| o.date >= start && o.date < end)
            .copied()
            .collect())
    }
}

const DATE_KEYS: [&str; 4] = ["date", "service_date", "servicedate", "created_at"];
const COUNT_KEYS: [&str; 4] = ["service_count", "servicecount", "services", "count"];
const VALUE_KEYS: [&str; 5] = ["monetary_value", "monetaryvalue", "value", "amount", "total"];

/// A single service record as the storage layer hands it over, normalized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawServiceRecord {
    pub date: NaiveDate,
    pub service_count: u32,
    pub monetary_value: f64,
}

impl RawServiceRecord {
    /// Normalize a loosely shaped JSON record.
    ///
    /// Keys are matched case-insensitively against known aliases. Numbers may
    /// arrive as strings. A missing count means one service; a missing value
    /// means zero. The date is mandatory; timestamps are truncated to the day.
    pub fn from_json(record: &Value) -> Result<Self> {
        let fields = record.as_object().ok_or_else(|| {
            ForecastError::DataError("Service record must be a JSON object".to_string())
        })?;

        let date = match lookup(fields, &DATE_KEYS) {
            Some(Value::String(raw)) => parse_day(raw)?,
            Some(other) => {
                return Err(ForecastError::DataError(format!(
                    "Unsupported date value: {}",
                    other
                )))
            }
            None => {
                return Err(ForecastError::DataError(
                    "Service record has no date".to_string(),
                ))
            }
        };

        let service_count = match lookup(fields, &COUNT_KEYS) {
            Some(value) => {
                let count = numeric(value)?;
                if count < 0.0 || count.fract() != 0.0 || count > u32::MAX as f64 {
                    return Err(ForecastError::DataError(format!(
                        "Service count on {} must be a non-negative integer, got {}",
                        date, count
                    )));
                }
                count as u32
            }
            None => 1,
        };

        let monetary_value = match lookup(fields, &VALUE_KEYS) {
            Some(value) => numeric(value)?,
            None => 0.0,
        };
        if monetary_value < 0.0 {
            return Err(ForecastError::DataError(format!(
                "Monetary value on {} cannot be negative",
                date
            )));
        }

        Ok(Self {
            date,
            service_count,
            monetary_value,
        })
    }

    /// Normalize a JSON array of records
    pub fn from_json_array(records: &Value) -> Result<Vec<Self>> {
        records
            .as_array()
            .ok_or_else(|| ForecastError::DataError("Expected an array of records".to_string()))?
            .iter()
            .map(Self::from_json)
            .collect()
    }
}

fn lookup<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    fields.iter().find_map(|(key, value)| {
        let key = key.to_lowercase();
        if aliases.contains(&key.as_str()) && !value.is_null() {
            Some(value)
        } else {
            None
        }
    })
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{}': {}", raw, e)))
}

fn numeric(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ForecastError::DataError(format!("Expected a number, got {}", value)))
}

/// Sum service records per calendar day, ordered by date
pub fn aggregate_daily(records: &[RawServiceRecord]) -> Vec<Observation> {
    let mut days: BTreeMap<NaiveDate, (u32, f64)> = BTreeMap::new();
    for record in records {
        let entry = days.entry(record.date).or_insert((0, 0.0));
        entry.0 = entry.0.saturating_add(record.service_count);
        entry.1 += record.monetary_value;
    }

    days.into_iter()
        .map(|(date, (service_count, monetary_value))| Observation {
            date,
            service_count,
            monetary_value,
        })
        .collect()
}

/// Sum daily observations per calendar month.
///
/// Months between the first and last observation that saw no activity are
/// emitted with zero totals so the series stays contiguous.
pub fn aggregate_monthly(observations: &[Observation]) -> Result<Vec<PeriodTotal>> {
    let mut months: BTreeMap<(i32, u32), (u64, f64)> = BTreeMap::new();
    for obs in observations {
        let entry = months
            .entry((obs.date.year(), obs.date.month()))
            .or_insert((0, 0.0));
        entry.0 += u64::from(obs.service_count);
        entry.1 += obs.monetary_value;
    }

    let (first, last) = match (months.keys().next(), months.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(Vec::new()),
    };

    let mut periods = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        let (count, value) = months.get(&(year, month)).copied().unwrap_or((0, 0.0));
        periods.push(PeriodTotal::month(year, month, count, value)?);

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    Ok(periods)
}

/// Drop observations on or after `today`; the current day is still accumulating
pub fn completed_before(observations: &[Observation], today: NaiveDate) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| o.date < today)
        .copied()
        .collect()
}

/// Data loader for daily observation exports
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load daily observations from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load daily observations from any CSV source with a header row.
    ///
    /// Columns are detected by name: one containing "date", one containing
    /// "count" or "services", one containing "value" or "amount".
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Observation>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let date_idx = Self::detect_column(&headers, &["date"])?;
        let count_idx = Self::detect_column(&headers, &["count", "services"])?;
        let value_idx = Self::detect_column(&headers, &["value", "amount"])?;

        let mut observations = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(idx).unwrap_or("").trim();

            let date = parse_day(field(date_idx))?;
            let service_count = field(count_idx).parse::<u32>().map_err(|e| {
                ForecastError::DataError(format!("Invalid service count on {}: {}", date, e))
            })?;
            let monetary_value = field(value_idx).parse::<f64>().map_err(|e| {
                ForecastError::DataError(format!("Invalid monetary value on {}: {}", date, e))
            })?;

            observations.push(Observation::new(date, service_count, monetary_value)?);
        }

        observations.sort_by_key(|o| o.date);
        Ok(observations)
    }

    fn detect_column(headers: &[String], needles: &[&str]) -> Result<usize> {
        headers
            .iter()
            .position(|h| needles.iter().any(|needle| h.contains(needle)))
            .ok_or_else(|| {
                ForecastError::DataError(format!("No column matching {:?} found in data", needles))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalizes_mixed_case_and_string_numbers() {
        let record = RawServiceRecord::from_json(&json!({
            "Service_Date": "2024-03-05T14:30:00Z",
            "AMOUNT": "1250.50"
        }))
        .unwrap();

        assert_eq!(record.date, day(2024, 3, 5));
        assert_eq!(record.service_count, 1);
        assert_eq!(record.monetary_value, 1250.5);
    }

    #[test]
    fn rejects_records_without_date() {
        let err = RawServiceRecord::from_json(&json!({ "value": 10 })).unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));
    }

    #[test]
    fn rejects_negative_counts() {
        let err =
            RawServiceRecord::from_json(&json!({ "date": "2024-03-05", "count": -2 })).unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));
    }

    #[test]
    fn aggregates_daily_then_monthly_with_gaps() {
        let records = vec![
            RawServiceRecord { date: day(2024, 1, 3), service_count: 1, monetary_value: 100.0 },
            RawServiceRecord { date: day(2024, 1, 3), service_count: 2, monetary_value: 50.0 },
            RawServiceRecord { date: day(2024, 3, 9), service_count: 1, monetary_value: 10.0 },
        ];

        let daily = aggregate_daily(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].service_count, 3);
        assert_eq!(daily[0].monetary_value, 150.0);

        let monthly = aggregate_monthly(&daily).unwrap();
        let labels: Vec<&str> = monthly.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(monthly[1].service_count, 0);
    }

    #[test]
    fn in_memory_provider_uses_half_open_range() {
        let series = InMemorySeries::new(vec![
            Observation::new(day(2024, 1, 2), 1, 1.0).unwrap(),
            Observation::new(day(2024, 1, 1), 1, 1.0).unwrap(),
            Observation::new(day(2024, 1, 3), 1, 1.0).unwrap(),
        ]);

        let window = series.observations(day(2024, 1, 1), day(2024, 1, 3)).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].date, day(2024, 1, 1));
    }
}
