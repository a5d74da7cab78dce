//! Errors surfaced by the planning engine

use capacity_planner::PlanningError;
use demand_forecast::ForecastError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether a provider or configuration store could not be reached
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(
            self,
            EngineError::Forecast(ForecastError::UpstreamUnavailable(_))
                | EngineError::Planning(PlanningError::UpstreamUnavailable(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
