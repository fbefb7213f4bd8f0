use serde::Serialize;

use crate::models::Detection;

/// Discrete severity bucket for a detection, ordered from least to most
/// severe. `Safe` is only ever the overall tier of an empty detection set;
/// individual detections always tier at `Low` or above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Map a percentage confidence to a tier. Band lower bounds are
    /// inclusive: exactly 80.0 is `High`, exactly 50.0 is `Medium`.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 80.0 {
            RiskTier::High
        } else if confidence >= 50.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "safe",
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }

    /// "Safe", "Low", "Medium", "High" - used for per-detection report lines.
    pub fn capitalized(&self) -> &'static str {
        match self {
            RiskTier::Safe => "Safe",
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    /// "SAFE", "LOW", "MEDIUM", "HIGH" - used for the report summary line.
    pub fn uppercased(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce a detection set to its overall risk: the maximum per-detection
/// tier, or `Safe` when nothing was detected.
pub fn overall_risk(detections: &[Detection]) -> RiskTier {
    detections
        .iter()
        .map(|d| RiskTier::from_confidence(d.confidence))
        .max()
        .unwrap_or(RiskTier::Safe)
}
