//! Combined configuration document and where it is loaded from.

use crate::error::{EngineError, Result};
use capacity_planner::PlannerConfig;
use demand_forecast::ForecastConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Forecasting and planning settings in one document
///
/// ```json
/// { "forecast": { "projection": { "momentum_threshold": 0.15 } },
///   "planner": { "simulator": { "seed": 7 } } }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub forecast: ForecastConfig,
    pub planner: PlannerConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.forecast.validate()?;
        self.planner.validate()?;
        Ok(())
    }
}

/// Source of the engine configuration, implemented by the hosting service
pub trait ConfigurationStore {
    fn load(&self) -> Result<EngineConfig>;
}

/// Configuration held as a JSON document
#[derive(Debug, Clone, Default)]
pub struct JsonConfigurationStore {
    document: String,
}

impl JsonConfigurationStore {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }
}

impl ConfigurationStore for JsonConfigurationStore {
    fn load(&self) -> Result<EngineConfig> {
        if self.document.trim().is_empty() {
            return Ok(EngineConfig::default());
        }
        EngineConfig::from_json(&self.document)
            .map_err(|e| EngineError::Config(format!("Invalid engine configuration: {}", e)))
    }
}
