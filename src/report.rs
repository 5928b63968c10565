//! Scene report post-processing.
//!
//! Turns raw pixel-space detections into the normalized report consumed by
//! downstream clients:
//! - class ids are mapped to names and filtered against an allow-list
//! - box center and width are normalized by image width into `[0, 1]`
//! - `door` detections are relabeled `door-open`/`door-closed` by width
//! - entries are rounded, then sorted by descending confidence

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classes::ClassTable;
use crate::config::LabelSettings;
use crate::detect::Detection;

/// One entry of the normalized scene report.
///
/// `x` is the horizontal box center and `width` the box width, both as a
/// fraction of image width. Field order is the wire order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub x: f64,
    pub width: f64,
    pub confidence: f64,
}

/// Build the normalized report from raw detections.
///
/// Detections with unknown class ids or labels outside the allow-list are
/// dropped. Sorting happens after rounding, so entries that round to the
/// same confidence keep the backend's emission order.
pub fn build_report(
    detections: &[Detection],
    image_width: u32,
    classes: &ClassTable,
    labels: &LabelSettings,
) -> Vec<ReportEntry> {
    let image_width = image_width as f32;
    let mut entries: Vec<ReportEntry> = detections
        .iter()
        .filter_map(|det| {
            let label = classes.name(det.class_id)?;
            if !labels.keep.iter().any(|keep| keep == label) {
                return None;
            }

            let x = det.center_x() / image_width;
            let width = det.width() / image_width;

            let label = if label == "door" {
                let state = if width > labels.door_open_width {
                    "open"
                } else {
                    "closed"
                };
                format!("door-{}", state)
            } else {
                label.to_string()
            };

            Some(ReportEntry {
                label,
                x: round_to(x as f64, 3),
                width: round_to(width as f64, 3),
                confidence: round_to(det.confidence as f64, 2),
            })
        })
        .collect();

    entries.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    entries
}

/// Serialize entries as the pretty-printed report document.
pub fn render_report(entries: &[ReportEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("failed to serialize report")
}

/// Write the report document to `path`.
pub fn write_report<P: AsRef<Path>>(path: P, entries: &[ReportEntry]) -> Result<()> {
    let path = path.as_ref();
    let rendered = render_report(entries)?;
    fs::write(path, rendered)
        .with_context(|| format!("writing report to {}", path.display()))?;
    Ok(())
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelSettings;

    fn det(class_id: usize, confidence: f32, x1: f32, x2: f32) -> Detection {
        Detection {
            class_id,
            confidence,
            x1,
            y1: 0.0,
            x2,
            y2: 50.0,
        }
    }

    #[test]
    fn filters_to_allow_list_and_normalizes() {
        let classes = ClassTable::coco();
        let labels = LabelSettings::default();
        // person kept; toothbrush (79) and an out-of-table id dropped.
        let dets = vec![
            det(0, 0.91, 100.0, 300.0),
            det(79, 0.99, 0.0, 10.0),
            det(400, 0.99, 0.0, 10.0),
        ];

        let report = build_report(&dets, 1000, &classes, &labels);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].label, "person");
        assert_eq!(report[0].x, 0.2);
        assert_eq!(report[0].width, 0.2);
        assert_eq!(report[0].confidence, 0.91);
    }

    #[test]
    fn sorts_by_confidence_descending() {
        let classes = ClassTable::coco();
        let labels = LabelSettings::default();
        let dets = vec![
            det(0, 0.52, 0.0, 100.0),
            det(56, 0.94, 0.0, 100.0),
            det(2, 0.71, 0.0, 100.0),
        ];

        let report = build_report(&dets, 1000, &classes, &labels);
        let order: Vec<&str> = report.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(order, vec!["chair", "car", "person"]);
    }

    #[test]
    fn rounds_coordinates_and_confidence() {
        let classes = ClassTable::coco();
        let labels = LabelSettings::default();
        let dets = vec![det(0, 0.8765, 1.0, 2.0)];

        let report = build_report(&dets, 3, &classes, &labels);
        assert_eq!(report[0].x, 0.5);
        assert_eq!(report[0].width, 0.333);
        assert_eq!(report[0].confidence, 0.88);
    }

    #[test]
    fn door_state_follows_width_heuristic() {
        // A door-aware model supplies its own class table.
        let classes = ClassTable::from_names(vec!["door".to_string()]);
        let labels = LabelSettings {
            keep: vec!["door".to_string()],
            door_open_width: 0.3,
        };

        let narrow = build_report(&[det(0, 0.9, 0.0, 250.0)], 1000, &classes, &labels);
        assert_eq!(narrow[0].label, "door-closed");

        // Width exactly at the threshold stays closed; the state flips
        // strictly above it.
        let boundary = build_report(&[det(0, 0.9, 0.0, 300.0)], 1000, &classes, &labels);
        assert_eq!(boundary[0].label, "door-closed");

        let wide = build_report(&[det(0, 0.9, 0.0, 450.0)], 1000, &classes, &labels);
        assert_eq!(wide[0].label, "door-open");
        assert_eq!(wide[0].width, 0.45);
    }

    #[test]
    fn render_is_pretty_json_array() -> Result<()> {
        let entries = vec![ReportEntry {
            label: "person".to_string(),
            x: 0.5,
            width: 0.25,
            confidence: 0.9,
        }];
        let rendered = render_report(&entries)?;
        assert!(rendered.starts_with("[\n"));
        assert!(rendered.contains("\"label\": \"person\""));

        let parsed: Vec<ReportEntry> = serde_json::from_str(&rendered)?;
        assert_eq!(parsed, entries);
        Ok(())
    }

    #[test]
    fn empty_report_renders_empty_array() -> Result<()> {
        assert_eq!(render_report(&[])?, "[]");
        Ok(())
    }
}
