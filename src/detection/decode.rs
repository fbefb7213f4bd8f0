use anyhow::{Result, ensure};
use tract_onnx::prelude::*;

use crate::models::{BoundingBox, Detection};

/// Scaling and filtering parameters for mapping raw model output back onto
/// the input image.
pub(crate) struct DecodeParams<'a> {
    pub scale_x: f32,
    pub scale_y: f32,
    pub image_width: f32,
    pub image_height: f32,
    pub confidence_threshold: f32,
    pub labels: &'a [String],
}

/// Decode a YOLO-style prediction block of shape (4 + num_classes,
/// candidates). Each candidate column holds a center-form box followed by
/// one score per class; the argmax score is the candidate's confidence.
/// Boxes are mapped back to input-image pixels and clamped to its bounds.
pub(crate) fn decode_predictions(
    preds: &tract_ndarray::ArrayViewD<f32>,
    params: &DecodeParams<'_>,
) -> Result<Vec<Detection>> {
    let shape = preds.shape();
    ensure!(
        shape.len() == 2 && shape[0] > 4,
        "unexpected model output shape {:?}",
        shape
    );

    let num_candidates = shape[1];
    let mut detections = Vec::new();

    for i in 0..num_candidates {
        let mut class_id = 0usize;
        let mut max_score = f32::NEG_INFINITY;
        for c in 4..shape[0] {
            let score = preds[[c, i]];
            if score > max_score {
                max_score = score;
                class_id = c - 4;
            }
        }

        if max_score > params.confidence_threshold {
            // Center-form box in model input coordinates.
            let cx = preds[[0, i]];
            let cy = preds[[1, i]];
            let w = preds[[2, i]];
            let h = preds[[3, i]];

            let bbox = BoundingBox {
                x1: ((cx - w / 2.0) * params.scale_x).clamp(0.0, params.image_width),
                y1: ((cy - h / 2.0) * params.scale_y).clamp(0.0, params.image_height),
                x2: ((cx + w / 2.0) * params.scale_x).clamp(0.0, params.image_width),
                y2: ((cy + h / 2.0) * params.scale_y).clamp(0.0, params.image_height),
            };

            let label = params
                .labels
                .get(class_id)
                .cloned()
                .unwrap_or_else(|| format!("defect-{class_id}"));

            // Raw score in [0, 1] becomes a percentage, two decimal places.
            let confidence = (max_score.clamp(0.0, 1.0) * 10_000.0).round() / 100.0;

            detections.push(Detection::new(label, confidence, bbox)?);
        }
    }

    Ok(detections)
}

/// Greedy class-aware non-maximum suppression. Candidates are visited in
/// descending confidence order; a candidate is dropped when a kept box of
/// the same class overlaps it beyond the IoU threshold.
pub(crate) fn non_max_suppression(
    mut candidates: Vec<Detection>,
    iou_threshold: f32,
) -> Vec<Detection> {
    candidates.sort_unstable_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept.iter().any(|k| {
            k.class_label == candidate.class_label
                && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
