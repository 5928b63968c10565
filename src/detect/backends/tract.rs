#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use image::RgbImage;
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{non_max_suppression, Detection};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Tract-based backend for YOLO-family ONNX models.
///
/// Loads a local model file and performs inference on RGB frames. The model
/// is expected to take a `1x3xSxS` float input in `[0,1]` and produce the
/// single-head `1 x (4 + classes) x anchors` prediction layout used by
/// YOLOv8-style exports. No network I/O happens beyond model loading.
pub struct TractBackend {
    model: OnnxPlan,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let size = input_size as usize;
        let model = tract_onnx::onnx()
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

        Ok(Self {
            model,
            input_size,
            confidence_threshold: 0.35,
            iou_threshold: 0.45,
            max_detections: 300,
        })
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Override the default NMS IoU threshold.
    pub fn with_iou(mut self, iou: f32) -> Self {
        self.iou_threshold = iou;
        self
    }

    /// Override the default cap on returned detections.
    pub fn with_max_detections(mut self, max_detections: usize) -> Self {
        self.max_detections = max_detections;
        self
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;

        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let frame = RgbImage::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", width, height))?;
        let size = self.input_size;
        let resized = if (width, height) == (size, size) {
            frame
        } else {
            image::imageops::resize(&frame, size, size, FilterType::Triangle)
        };

        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, size as usize, size as usize),
            |(_, channel, y, x)| resized.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        );

        Ok(input.into_tensor())
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let preds = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;

        let scale_x = width as f32 / self.input_size as f32;
        let scale_y = height as f32 / self.input_size as f32;
        let candidates = decode_predictions(
            preds,
            self.confidence_threshold,
            scale_x,
            scale_y,
            width as f32,
            height as f32,
        )?;

        let mut detections = non_max_suppression(candidates, self.iou_threshold);
        detections.truncate(self.max_detections);
        Ok(detections)
    }

    fn warm_up(&mut self) -> Result<()> {
        let size = self.input_size;
        let blank = vec![0u8; (size as usize) * (size as usize) * 3];
        self.detect(&blank, size, size).map(|_| ())
    }
}

/// Decode a YOLOv8-style `1 x (4 + classes) x anchors` prediction head.
///
/// Rows 0..4 are `cx, cy, w, h` in model-input pixels; the remaining rows are
/// per-class scores. The best class wins each anchor, anchors below
/// `confidence_threshold` are dropped, and boxes are rescaled to the source
/// image and clamped to its bounds.
fn decode_predictions(
    preds: tract_ndarray::ArrayViewD<f32>,
    confidence_threshold: f32,
    scale_x: f32,
    scale_y: f32,
    frame_width: f32,
    frame_height: f32,
) -> Result<Vec<Detection>> {
    let shape = preds.shape();
    if shape.len() != 3 || shape[0] != 1 || shape[1] <= 4 {
        return Err(anyhow!(
            "unsupported model output shape {:?}; expected [1, 4 + classes, anchors]",
            shape
        ));
    }
    let num_classes = shape[1] - 4;
    let num_anchors = shape[2];

    let mut detections = Vec::new();
    for anchor in 0..num_anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for class in 0..num_classes {
            let score = preds[[0, 4 + class, anchor]];
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }
        if best_score < confidence_threshold {
            continue;
        }

        let cx = preds[[0, 0, anchor]];
        let cy = preds[[0, 1, anchor]];
        let w = preds[[0, 2, anchor]];
        let h = preds[[0, 3, anchor]];

        detections.push(Detection {
            class_id: best_class,
            confidence: best_score,
            x1: ((cx - w / 2.0) * scale_x).clamp(0.0, frame_width),
            y1: ((cy - h / 2.0) * scale_y).clamp(0.0, frame_height),
            x2: ((cx + w / 2.0) * scale_x).clamp(0.0, frame_width),
            y2: ((cy + h / 2.0) * scale_y).clamp(0.0, frame_height),
        });
    }

    Ok(detections)
}
