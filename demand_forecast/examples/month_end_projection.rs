use chrono::{Datelike, NaiveDate};
use demand_forecast::{
    HistoricalSeriesProvider, InMemorySeries, Observation, SeasonalProjector,
    WeekdaySeasonalityAnalyzer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Demand Forecast: Month-End Projection Example");
    println!("=============================================\n");

    let today = NaiveDate::from_ymd_opt(2024, 6, 11).ok_or("invalid date")?;
    let provider = InMemorySeries::new(create_sample_history(today)?);

    // Weekday pattern over the trailing window, today excluded
    let analyzer = WeekdaySeasonalityAnalyzer::default();
    let (start, end) = analyzer.trailing_window(today)?;
    let history = provider.observations(start, end)?;
    let pattern = analyzer.analyze(&history);

    println!(
        "Pattern from {} samples (confidence {:.2}, {})",
        pattern.samples_analyzed(),
        pattern.confidence(),
        pattern.confidence_label()
    );
    for bucket in pattern.weekdays() {
        println!(
            "  {:?}: {:>6.1} services, {:>12.2} value ({} samples)",
            bucket.weekday, bucket.average_count, bucket.average_value, bucket.samples
        );
    }

    let month_start = today.with_day(1).ok_or("invalid date")?;
    let month_to_date = provider.observations(month_start, today)?;
    let projection = SeasonalProjector::default().project(&pattern, &month_to_date, today)?;

    println!("\nMonth-to-date actual: {:>14.2}", projection.month_to_date_actual_value);
    println!("Projected remaining:  {:>14.2}", projection.projected_remaining_value);
    println!("Projected total:      {:>14.2}", projection.total_projected_value);
    println!("  weekdays {:.2} / weekends {:.2}", projection.weekday_subtotal, projection.weekend_subtotal);
    println!("Confidence: {}", projection.confidence_label);
    println!("Method: {}", projection.methodology_note);

    Ok(())
}

fn create_sample_history(today: NaiveDate) -> Result<Vec<Observation>, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 2, 1).ok_or("invalid date")?;
    let mut observations = Vec::new();

    for (i, date) in start.iter_days().take_while(|d| *d < today).enumerate() {
        // Busier Fridays and Saturdays, a gentle upward drift
        let weekday_boost = match date.weekday().num_days_from_monday() {
            4 | 5 => 1.3,
            6 => 0.7,
            _ => 1.0,
        };
        let count = ((40.0 + i as f64 * 0.05) * weekday_boost).round() as u32;
        observations.push(Observation::new(date, count, count as f64 * 6_000.0)?);
    }

    Ok(observations)
}
