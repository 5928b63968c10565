//! scenescan - scene reports from a pretrained object-detection model
//!
//! The crate wraps a black-box detector behind [`detect::DetectorBackend`]
//! and owns everything around that call:
//! 1. Input acquisition: decode a local image, record its dimensions.
//! 2. Model invocation: run the configured backend over the pixels.
//! 3. Post-processing: allow-list filtering, width normalization, the
//!    door open/closed width heuristic.
//! 4. Output: confidence-sorted, pretty-printed JSON.
//!
//! Detection itself (proposals, NMS, classification) happens inside the
//! pretrained model artifact; swapping the model swaps the vocabulary.

pub mod classes;
pub mod config;
pub mod detect;
pub mod ingest;
pub mod report;

use anyhow::Result;

pub use classes::ClassTable;
pub use config::{LabelSettings, ModelSettings, ScanConfig};
pub use detect::{BackendRegistry, Detection, DetectorBackend, StubBackend};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use ingest::{load_image, ImageFrame};
pub use report::{build_report, render_report, write_report, ReportEntry};

/// Run the full detect-and-report pipeline on one frame.
///
/// `backend` selects a registered backend by name; `None` uses the
/// registry default.
pub fn scan_frame(
    registry: &BackendRegistry,
    backend: Option<&str>,
    frame: &ImageFrame,
    cfg: &ScanConfig,
) -> Result<Vec<ReportEntry>> {
    let detections = registry.detect_with(backend, frame.pixels(), frame.width, frame.height)?;
    log::debug!("backend returned {} raw detections", detections.len());
    Ok(build_report(
        &detections,
        frame.width,
        &cfg.class_table(),
        &cfg.labels,
    ))
}
