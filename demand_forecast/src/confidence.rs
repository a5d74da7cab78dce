//! Coarse confidence labels shown next to forecasts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-step confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl ConfidenceLabel {
    /// Label a numeric confidence: above 0.8 is high, below 0.6 is low
    pub fn from_score(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceLabel::High
        } else if confidence < 0.6 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::Medium
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLabel::Low => "low",
            ConfidenceLabel::Medium => "medium",
            ConfidenceLabel::High => "high",
        };
        f.write_str(label)
    }
}
