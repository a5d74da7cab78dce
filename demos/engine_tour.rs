// Walks through the engine end to end on synthetic data
use chrono::{Datelike, NaiveDate};
use custody_ops_engine::capacity_planner::{Channel, SimulationParameters, StaticZoneMetrics};
use custody_ops_engine::demand_forecast::{InMemorySeries, Observation};
use custody_ops_engine::{ConfigurationStore, JsonConfigurationStore, PlanningEngine};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    println!("Custody ops engine tour\n");

    let store = JsonConfigurationStore::new(
        r#"{ "planner": { "simulator": { "iterations": 2000, "seed": 42 } } }"#,
    );
    let config = store.load()?;

    let engine = PlanningEngine::new(synthetic_history()?, synthetic_zones()?, config)?;
    let as_of = NaiveDate::from_ymd_opt(2024, 9, 18).ok_or("invalid date")?;

    // Forecasting
    println!("=== Forecast as of {} ===", as_of);
    let dashboard = engine.forecast_dashboard(as_of, 18)?;
    for bucket in dashboard.pattern.weekdays() {
        println!(
            "  {:?}: {:>6.1} services, {:>10.0} value ({} samples)",
            bucket.weekday, bucket.average_count, bucket.average_value, bucket.samples
        );
    }
    let projection = &dashboard.projection;
    println!(
        "  month-end total {:.0} ({:.0} actual + {:.0} projected), confidence {}",
        projection.total_projected_value,
        projection.month_to_date_actual_value,
        projection.projected_remaining_value,
        projection.confidence_label
    );
    println!("  {}", projection.methodology_note);

    let summary = &dashboard.backtest.summary;
    println!(
        "  backtest: {} periods, accuracy {:.1}%, best model {}",
        summary.evaluated_periods,
        summary.overall_accuracy,
        summary.best_model_name.as_deref().unwrap_or("n/a")
    );

    // Capacity
    println!("\n=== Zones ===");
    let assessments = engine.zone_assessments()?;
    for assessment in &assessments {
        println!(
            "  {:<8} urgency {}  deficit {:.1}/day",
            assessment.metric.zone_id, assessment.urgency, assessment.deficit.deficit_total
        );
    }

    // Recruitment
    if let Some(top) = assessments.first() {
        println!("\n=== Recruitment for {} ===", top.metric.zone_id);
        let params = SimulationParameters::new(
            40_000.0,
            120,
            vec![
                Channel::new("referral", 250.0, 10.0, 420.0),
                Channel::new("job_board", 380.0, 25.0, 280.0),
                Channel::new("social", 200.0, 12.0, 360.0),
            ],
        );
        let result = engine.simulate_recruitment(&params, Some(top.metric.zone_id.as_str()))?;
        for (channel, amount) in &result.optimal_allocation {
            println!("  {:<10} {:>8.0}", channel, amount);
        }
        println!(
            "  {:.1} expected hires in {} days, risk {}",
            result.expected_acquisitions, result.optimal_timeline_days, result.risk_level
        );
    }

    println!("\nDone");
    Ok(())
}

fn synthetic_history() -> Result<InMemorySeries, Box<dyn Error>> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).ok_or("invalid date")?;
    let mut observations = Vec::new();
    for (i, date) in start.iter_days().take(640).enumerate() {
        let weekday = date.weekday().num_days_from_monday();
        let base = if weekday >= 5 { 12 } else { 20 };
        let count = base + (i / 60) as u32;
        observations.push(Observation::new(date, count, count as f64 * 450.0)?);
    }
    Ok(InMemorySeries::new(observations))
}

fn synthetic_zones() -> Result<StaticZoneMetrics, Box<dyn Error>> {
    Ok(StaticZoneMetrics::from_json(
        r#"[
            { "zone_id": "north", "active_capacity_units": 22, "average_daily_service_volume": 26.0 },
            { "zone_id": "south", "active_capacity_units": 9, "average_daily_service_volume": 34.0 },
            { "zone_id": "central", "active_capacity_units": 40, "average_daily_service_volume": 31.0 }
        ]"#,
    )?)
}
