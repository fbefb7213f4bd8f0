use anyhow::{Result, ensure};
use serde::Serialize;

/// Axis-aligned box in pixel coordinates of the input image.
/// Corner form: (x1, y1) is the top-left, (x2, y2) the bottom-right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) * (y2 - y1)
        } else {
            0.0
        }
    }

    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// One detected defect region: class label, confidence as a percentage
/// (0-100, two decimal places), and its bounding box.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub class_label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Build a detection, validating the record invariants.
    /// Confidence must be a finite percentage and the box corners ordered.
    pub fn new(class_label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Result<Self> {
        ensure!(
            confidence.is_finite() && (0.0..=100.0).contains(&confidence),
            "confidence {} outside [0, 100]",
            confidence
        );
        ensure!(
            bbox.x1 <= bbox.x2 && bbox.y1 <= bbox.y2,
            "bounding box corners out of order: ({}, {}) .. ({}, {})",
            bbox.x1,
            bbox.y1,
            bbox.x2,
            bbox.y2
        );

        Ok(Self {
            class_label: class_label.into(),
            confidence,
            bbox,
        })
    }
}
