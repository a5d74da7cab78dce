use demand_forecast::{BacktestEngine, ForecastConfig, PeriodTotal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Demand Forecast: Walk-Forward Backtest Example");
    println!("==============================================\n");

    let series = create_sample_months()?;
    let engine = BacktestEngine::from_config(&ForecastConfig::default())?;
    let report = engine.run(&series)?;

    for case in &report.cases {
        println!("{} actual {:>5} services", case.period_label, case.actual_count);
        for forecast in &case.forecasts {
            println!(
                "    {:<20} {:>8.1}  APE {}",
                forecast.forecast.model_name,
                forecast.forecast.predicted_count,
                forecast
                    .count_ape
                    .map(|ape| format!("{:.2}%", ape))
                    .unwrap_or_else(|| "n/a".to_string())
            );
        }
    }

    let summary = &report.summary;
    println!("\nBest model:  {}", summary.best_model_name.as_deref().unwrap_or("n/a"));
    println!("Best period: {}", summary.best_period_label.as_deref().unwrap_or("n/a"));
    println!("Worst period: {}", summary.worst_period_label.as_deref().unwrap_or("n/a"));
    println!("Accuracy:    {:.2}% ({})", summary.overall_accuracy, summary.confidence_label);

    Ok(())
}

fn create_sample_months() -> Result<Vec<PeriodTotal>, Box<dyn std::error::Error>> {
    let counts = [980, 1_010, 1_100, 1_150, 1_320, 1_400, 1_380, 1_300, 1_200, 1_150, 1_080, 1_060, 1_020, 1_090];
    let mut months = Vec::new();
    for (i, &count) in counts.iter().enumerate() {
        let year = 2023 + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        months.push(PeriodTotal::month(year, month, count, count as f64 * 6_100.0)?);
    }
    Ok(months)
}
