use chrono::NaiveDate;
use demand_forecast::{
    aggregate_daily, aggregate_monthly, completed_before, DataLoader, ForecastError,
    HistoricalSeriesProvider, InMemorySeries, RawServiceRecord,
};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_csv_loader_detects_columns_and_sorts() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Service Date,Services,Total Amount").unwrap();
    writeln!(file, "2024-01-03,5,1500.0").unwrap();
    writeln!(file, "2024-01-01,4,1200.5").unwrap();
    writeln!(file, "2024-01-02,0,0").unwrap();

    let observations = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(observations.len(), 3);
    assert_eq!(observations[0].date, day(2024, 1, 1));
    assert_eq!(observations[0].service_count, 4);
    assert_eq!(observations[0].monetary_value, 1200.5);
    assert_eq!(observations[2].service_count, 5);
}

#[test]
fn test_csv_loader_rejects_missing_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "day,services").unwrap();
    writeln!(file, "2024-01-03,5").unwrap();

    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_csv_loader_missing_file_is_io_error() {
    let err = DataLoader::from_csv("/nonexistent/history.csv").unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn test_raw_records_to_monthly_periods() {
    let raw = json!([
        { "date": "2024-01-15", "value": 100 },
        { "DATE": "2024-01-15", "Value": "250.0" },
        { "service_date": "2024-02-01T08:00:00", "services": 3, "amount": 900 },
        { "created_at": "2024-02-20", "monetary_value": null }
    ]);

    let records = RawServiceRecord::from_json_array(&raw).unwrap();
    let daily = aggregate_daily(&records);
    assert_eq!(daily.len(), 3);
    assert_eq!(daily[0].service_count, 2);
    assert_eq!(daily[0].monetary_value, 350.0);

    let monthly = aggregate_monthly(&daily).unwrap();
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[1].label, "2024-02");
    assert_eq!(monthly[1].service_count, 4);
    assert_eq!(monthly[1].monetary_value, 900.0);
}

#[test]
fn test_bad_date_is_rejected_at_the_boundary() {
    let err = RawServiceRecord::from_json(&json!({ "date": "15/01/2024" })).unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_in_progress_day_is_dropped() {
    let records = vec![
        RawServiceRecord { date: day(2024, 3, 9), service_count: 1, monetary_value: 1.0 },
        RawServiceRecord { date: day(2024, 3, 10), service_count: 1, monetary_value: 1.0 },
    ];
    let daily = aggregate_daily(&records);
    let complete = completed_before(&daily, day(2024, 3, 10));
    assert_eq!(complete.len(), 1);

    let series = InMemorySeries::new(daily);
    assert_eq!(series.observations(day(2024, 3, 1), day(2024, 3, 10)).unwrap().len(), 1);
}
