mod decode;
pub mod preprocessing;

use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};
use image::{DynamicImage, RgbImage};
use log::{debug, info};
use tract_onnx::prelude::*;

use crate::annotate;
use crate::models::Detection;

/// Class table for models trained against the reference defect dataset.
/// Overridable with a labels file, one class name per line.
pub const DEFAULT_DEFECT_CLASSES: &[&str] = &[
    "crack",
    "dent",
    "corrosion",
    "paint-peel",
    "rivet-damage",
    "scratch",
];

/// Tunables for model input and postprocessing.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Edge length of the model's square input, in pixels.
    pub input_size: u32,
    /// Minimum raw score in [0, 1] for a candidate to survive decoding.
    pub confidence_threshold: f32,
    /// IoU above which same-class boxes are suppressed.
    pub iou_threshold: f32,
    /// Hard cap on detections returned from one pass.
    pub max_detections: usize,
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }

    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one detection pass: an annotated copy of the input (same
/// dimensions, boxes and labels drawn in) and the detection set. The set is
/// empty when nothing qualified, which is a success, not an error.
pub struct DetectionOutput {
    pub annotated: RgbImage,
    pub detections: Vec<Detection>,
}

/// Wraps the pretrained ONNX defect model. Loaded once at startup and
/// read-only afterwards; every request goes through `detect`.
pub struct DefectDetector {
    plan: TypedSimplePlan<TypedModel>,
    labels: Vec<String>,
    config: DetectorConfig,
}

impl DefectDetector {
    /// Load an ONNX model from disk and prepare it for inference.
    /// Failure here is fatal to the process, not a per-request condition.
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        labels: Vec<String>,
        config: DetectorConfig,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let size = config.input_size as usize;

        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        info!(
            "loaded defect model {} ({} classes, {}px input)",
            model_path.display(),
            labels.len(),
            config.input_size
        );

        Ok(Self {
            plan,
            labels,
            config,
        })
    }

    /// Run one inference pass: normalize, infer, decode, suppress, annotate.
    pub fn detect(&self, img: &DynamicImage) -> Result<DetectionOutput> {
        let rgb = preprocessing::to_rgb(img);
        let (width, height) = rgb.dimensions();
        debug!("running inference on {}x{} image", width, height);

        let resized = preprocessing::resize_to_input(&rgb, self.config.input_size);
        let input = preprocessing::to_tensor(&resized);

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let preds = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        // Drop the batch axis: (1, 4 + classes, candidates) -> 2D block.
        ensure!(
            preds.ndim() == 3,
            "unexpected model output rank {} (shape {:?})",
            preds.ndim(),
            preds.shape()
        );
        let preds = preds.index_axis(tract_ndarray::Axis(0), 0);

        let params = decode::DecodeParams {
            scale_x: width as f32 / self.config.input_size as f32,
            scale_y: height as f32 / self.config.input_size as f32,
            image_width: width as f32,
            image_height: height as f32,
            confidence_threshold: self.config.confidence_threshold,
            labels: &self.labels,
        };
        let candidates = decode::decode_predictions(&preds, &params)?;
        debug!("{} candidates above threshold", candidates.len());

        let mut detections = decode::non_max_suppression(candidates, self.config.iou_threshold);
        detections.truncate(self.config.max_detections);
        debug!("{} detections after suppression", detections.len());

        let annotated = annotate::draw_detections(&rgb, &detections);

        Ok(DetectionOutput {
            annotated,
            detections,
        })
    }
}
