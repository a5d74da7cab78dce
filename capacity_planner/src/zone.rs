//! Zone demand metrics and the provider boundary they arrive through.

use crate::error::{PlanningError, Result};
use serde::{Deserialize, Serialize};

/// Current capacity and demand of one service zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDemandMetric {
    pub zone_id: String,
    /// Units currently available for assignments
    pub active_capacity_units: u32,
    /// Average services requested per day
    pub average_daily_service_volume: f64,
}

impl ZoneDemandMetric {
    pub fn new(
        zone_id: impl Into<String>,
        active_capacity_units: u32,
        average_daily_service_volume: f64,
    ) -> Result<Self> {
        let zone_id = zone_id.into();
        if !average_daily_service_volume.is_finite() || average_daily_service_volume < 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "Zone {} has an invalid daily volume {}",
                zone_id, average_daily_service_volume
            )));
        }

        Ok(Self {
            zone_id,
            active_capacity_units,
            average_daily_service_volume,
        })
    }

    /// Validate a metric that arrived without going through [`ZoneDemandMetric::new`]
    pub fn validate(&self) -> Result<()> {
        Self::new(
            self.zone_id.clone(),
            self.active_capacity_units,
            self.average_daily_service_volume,
        )
        .map(|_| ())
    }
}

/// Read-only source of per-zone metrics.
///
/// Implementations report an unreachable backing store as
/// [`PlanningError::UpstreamUnavailable`].
pub trait ZoneMetricsProvider {
    fn zone_metrics(&self) -> Result<Vec<ZoneDemandMetric>>;
}

/// Fixed set of zone metrics, e.g. loaded from a JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticZoneMetrics {
    zones: Vec<ZoneDemandMetric>,
}

impl StaticZoneMetrics {
    pub fn new(zones: Vec<ZoneDemandMetric>) -> Self {
        Self { zones }
    }

    /// Parse a JSON array of zone metrics
    pub fn from_json(json: &str) -> Result<Self> {
        let zones: Vec<ZoneDemandMetric> = serde_json::from_str(json)?;
        for zone in &zones {
            zone.validate()?;
        }
        Ok(Self { zones })
    }
}

impl ZoneMetricsProvider for StaticZoneMetrics {
    fn zone_metrics(&self) -> Result<Vec<ZoneDemandMetric>> {
        Ok(self.zones.clone())
    }
}
