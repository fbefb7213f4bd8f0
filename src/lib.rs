pub mod annotate;
pub mod detection;
pub mod models;
pub mod report;
pub mod risk;

pub use detection::{DEFAULT_DEFECT_CLASSES, DefectDetector, DetectionOutput, DetectorConfig};
pub use models::{BoundingBox, Detection};
pub use risk::{RiskTier, overall_risk};
