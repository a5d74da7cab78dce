//! Size a recruitment budget for the most urgent zone.
//!
//! `cargo run -p capacity_planner --example budget_simulation`

use capacity_planner::{
    CapacityDeficitCalculator, Channel, PlannerConfig, ScenarioSimulator, SimulationParameters,
    StaticZoneMetrics,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let config = PlannerConfig::from_json(r#"{ "simulator": { "iterations": 3000, "seed": 17 } }"#)?;

    let zones = StaticZoneMetrics::from_json(
        r#"[
            { "zone_id": "harbour", "active_capacity_units": 18, "average_daily_service_volume": 42.0 },
            { "zone_id": "uptown", "active_capacity_units": 30, "average_daily_service_volume": 25.0 },
            { "zone_id": "airport", "active_capacity_units": 6, "average_daily_service_volume": 31.0 }
        ]"#,
    )?;

    let calculator = CapacityDeficitCalculator::new(config.capacity.clone(), config.urgency.clone())?;
    let assessments = calculator.assess_provider(&zones)?;

    println!("Zone urgency");
    for assessment in &assessments {
        println!(
            "  {:<10} urgency {:>5}  deficit {:>6.1}/day  shortfall {:>5.1} units{}",
            assessment.metric.zone_id,
            assessment.urgency.to_string(),
            assessment.deficit.deficit_total,
            assessment.deficit.unit_shortfall(),
            if assessment.at_risk { "  AT RISK" } else { "" }
        );
    }

    let Some(most_urgent) = assessments.first() else {
        return Ok(());
    };

    let simulator = ScenarioSimulator::new(config.constraints.clone(), config.simulator.clone())?
        .with_acquisition_target(most_urgent.deficit.unit_shortfall().ceil())?;

    let params = SimulationParameters::new(
        60_000.0,
        180,
        vec![
            Channel::new("referral", 300.0, 6.0, 480.0),
            Channel::new("job_board", 450.0, 20.0, 260.0),
            Channel::new("agency", 900.0, 12.0, 210.0),
            Channel::new("social", 220.0, 8.0, 390.0),
        ],
    );
    let result = simulator.run(&params)?;

    println!("\nRecruitment plan for {}", most_urgent.metric.zone_id);
    for (channel, amount) in &result.optimal_allocation {
        let sensitivity = result.sensitivity_by_channel.get(channel).copied().unwrap_or(0.0);
        println!("  {:<10} {:>10.0}  sensitivity {:>6.1}", channel, amount, sensitivity);
    }
    println!(
        "  expected {:.1} hires (p10 {:.1}, p90 {:.1}) within {} days, risk {}",
        result.expected_acquisitions,
        result.acquisitions_p10,
        result.acquisitions_p90,
        result.optimal_timeline_days,
        result.risk_level
    );
    println!("  constraints: {:?}", result.constraint_status);

    for alternative in &result.alternative_scenarios {
        println!(
            "  {} -> {:.1} hires (sampled {:.1}%)",
            alternative.name,
            alternative.expected_acquisitions,
            alternative.probability * 100.0
        );
    }

    Ok(())
}
