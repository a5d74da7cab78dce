//! Capacity deficits per service segment and zone urgency.
//!
//! Nominal units are reduced by the rejection ratio and segment efficiency,
//! then split across segments in proportion to the unit-hours each segment
//! demands. A segment's deficit is the daily volume its share of capacity
//! cannot serve.

use crate::config::{CapacityConfig, SegmentSpec, UrgencyConfig};
use crate::error::Result;
use crate::zone::{ZoneDemandMetric, ZoneMetricsProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Service-duration class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Local,
    Longhaul,
    Express,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Local, Segment::Longhaul, Segment::Express];
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Local => write!(f, "local"),
            Segment::Longhaul => write!(f, "longhaul"),
            Segment::Express => write!(f, "express"),
        }
    }
}

/// Demand, capacity and deficit of one segment, in services per day unless noted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFigure {
    pub segment: Segment,
    pub demand: f64,
    /// Units needed to serve the whole segment demand
    pub required_units: f64,
    /// Effective units assigned to the segment
    pub allocated_units: f64,
    pub served_capacity: f64,
    pub deficit: f64,
}

/// Segment breakdown for one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeficitAnalysis {
    pub zone_id: String,
    /// Units left after rejection and efficiency losses
    pub effective_capacity: f64,
    pub segments: Vec<SegmentFigure>,
    pub deficit_local: f64,
    pub deficit_longhaul: f64,
    pub deficit_express: f64,
    pub deficit_total: f64,
}

impl DeficitAnalysis {
    pub fn segment(&self, segment: Segment) -> Option<&SegmentFigure> {
        self.segments.iter().find(|s| s.segment == segment)
    }

    /// Effective units missing to serve the whole zone demand
    pub fn unit_shortfall(&self) -> f64 {
        let required: f64 = self.segments.iter().map(|s| s.required_units).sum();
        (required - self.effective_capacity).max(0.0)
    }
}

/// Integer urgency in `0..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UrgencyScore(u8);

impl UrgencyScore {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for UrgencyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

/// Deficit and urgency of one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAssessment {
    pub metric: ZoneDemandMetric,
    pub deficit: DeficitAnalysis,
    pub urgency: UrgencyScore,
    pub at_risk: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CapacityDeficitCalculator {
    capacity: CapacityConfig,
    urgency: UrgencyConfig,
}

impl CapacityDeficitCalculator {
    pub fn new(capacity: CapacityConfig, urgency: UrgencyConfig) -> Result<Self> {
        capacity.validate()?;
        urgency.validate()?;
        Ok(Self { capacity, urgency })
    }

    fn segment_spec(&self, segment: Segment) -> SegmentSpec {
        match segment {
            Segment::Local => self.capacity.segments.local,
            Segment::Longhaul => self.capacity.segments.longhaul,
            Segment::Express => self.capacity.segments.express,
        }
    }

    /// Split a zone's demand and capacity across segments
    pub fn analyze(&self, metric: &ZoneDemandMetric) -> Result<DeficitAnalysis> {
        metric.validate()?;

        let effective_capacity = metric.active_capacity_units as f64
            * (1.0 - self.capacity.rejection_ratio)
            * self.capacity.segment_efficiency;
        let unit_hours = self.capacity.unit_hours_per_day;

        let hour_weight =
            |spec: SegmentSpec| spec.demand_share * spec.duration_hours;
        let total_weight: f64 = Segment::ALL
            .iter()
            .map(|&s| hour_weight(self.segment_spec(s)))
            .sum();

        let segments: Vec<SegmentFigure> = Segment::ALL
            .iter()
            .map(|&segment| {
                let spec = self.segment_spec(segment);
                let demand = metric.average_daily_service_volume * spec.demand_share;
                let allocated_units = if total_weight > 0.0 {
                    effective_capacity * hour_weight(spec) / total_weight
                } else {
                    0.0
                };
                let served_capacity = allocated_units * unit_hours / spec.duration_hours;

                SegmentFigure {
                    segment,
                    demand,
                    required_units: demand * spec.duration_hours / unit_hours,
                    allocated_units,
                    served_capacity,
                    deficit: (demand - served_capacity).max(0.0),
                }
            })
            .collect();

        let deficit_of = |segment: Segment| {
            segments
                .iter()
                .find(|s| s.segment == segment)
                .map_or(0.0, |s| s.deficit)
        };
        let deficit_local = deficit_of(Segment::Local);
        let deficit_longhaul = deficit_of(Segment::Longhaul);
        let deficit_express = deficit_of(Segment::Express);

        let analysis = DeficitAnalysis {
            zone_id: metric.zone_id.clone(),
            effective_capacity,
            deficit_total: deficit_local + deficit_longhaul + deficit_express,
            deficit_local,
            deficit_longhaul,
            deficit_express,
            segments,
        };

        debug!(
            zone = %analysis.zone_id,
            effective_capacity,
            deficit_total = analysis.deficit_total,
            "Analyzed zone capacity"
        );

        Ok(analysis)
    }

    /// Urgency from the unmet share of volume and the load per unit.
    ///
    /// A zone without any deficit never scores at or above the risk threshold.
    pub fn urgency_score(
        &self,
        deficit_total: f64,
        daily_volume: f64,
        capacity_units: u32,
    ) -> UrgencyScore {
        let deficit_total = deficit_total.max(0.0);
        let daily_volume = daily_volume.max(0.0);

        let deficit_ratio = if daily_volume > 0.0 {
            (deficit_total / daily_volume).min(1.0)
        } else {
            0.0
        };
        let load_ratio = if capacity_units > 0 {
            (daily_volume / capacity_units as f64 / self.urgency.load_saturation).min(1.0)
        } else if daily_volume > 0.0 {
            1.0
        } else {
            0.0
        };

        let raw = 10.0
            * (self.urgency.deficit_weight * deficit_ratio + self.urgency.load_weight * load_ratio);
        let mut score = raw.round().clamp(0.0, 10.0) as u8;

        if deficit_total <= 0.0 {
            score = score.min(self.urgency.risk_threshold.saturating_sub(1));
        }

        UrgencyScore(score)
    }

    pub fn assess(&self, metric: &ZoneDemandMetric) -> Result<ZoneAssessment> {
        let deficit = self.analyze(metric)?;
        let urgency = self.urgency_score(
            deficit.deficit_total,
            metric.average_daily_service_volume,
            metric.active_capacity_units,
        );

        Ok(ZoneAssessment {
            metric: metric.clone(),
            at_risk: urgency.value() >= self.urgency.risk_threshold,
            deficit,
            urgency,
        })
    }

    /// Assess every zone, most urgent first
    pub fn assess_zones(&self, metrics: &[ZoneDemandMetric]) -> Result<Vec<ZoneAssessment>> {
        let mut assessments = metrics
            .iter()
            .map(|m| self.assess(m))
            .collect::<Result<Vec<_>>>()?;

        // Stable sort keeps provider order among equal scores
        assessments.sort_by(|a, b| b.urgency.cmp(&a.urgency));

        info!(
            zones = assessments.len(),
            at_risk = assessments.iter().filter(|a| a.at_risk).count(),
            "Assessed zone capacity"
        );

        Ok(assessments)
    }

    pub fn assess_provider<P: ZoneMetricsProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<Vec<ZoneAssessment>> {
        let metrics = provider.zone_metrics()?;
        self.assess_zones(&metrics)
    }
}
