use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Stub backend for testing and model-less builds.
///
/// With canned detections it replays them on every call. Otherwise it derives
/// a single deterministic pseudo-detection from a SHA-256 hash of the pixels,
/// so identical frames always produce identical output.
pub struct StubBackend {
    canned: Option<Vec<Detection>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self { canned: None }
    }

    /// Replay the given detections on every `detect` call.
    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self {
            canned: Some(detections),
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        if let Some(canned) = &self.canned {
            return Ok(canned.clone());
        }

        let hash: [u8; 32] = Sha256::digest(pixels).into();

        // Box position/size and confidence follow the pixel hash; class 0
        // ("person") keeps the pseudo-detection inside the default allow-list.
        let w = width as f32;
        let h = height as f32;
        let cx = (hash[0] as f32 / 255.0) * w;
        let cy = (hash[1] as f32 / 255.0) * h;
        let half_w = (0.05 + 0.20 * hash[2] as f32 / 255.0) * w;
        let half_h = (0.05 + 0.20 * hash[3] as f32 / 255.0) * h;
        let confidence = 0.5 + 0.49 * hash[4] as f32 / 255.0;

        Ok(vec![Detection {
            class_id: 0,
            confidence,
            x1: (cx - half_w).max(0.0),
            y1: (cy - half_h).max(0.0),
            x2: (cx + half_w).min(w),
            y2: (cy + half_h).min(h),
        }])
    }
}
