use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::classes::ClassTable;

const DEFAULT_MODEL_PATH: &str = "yolov8m.onnx";
const DEFAULT_INPUT_SIZE: u32 = 640;
const DEFAULT_CONFIDENCE: f32 = 0.35;
const DEFAULT_IOU: f32 = 0.45;
const DEFAULT_MAX_DETECTIONS: usize = 300;
const DEFAULT_DOOR_OPEN_WIDTH: f32 = 0.3;

/// Labels kept in the report by default: the scene furniture/vehicle set the
/// downstream consumers care about.
const DEFAULT_KEY_LABELS: [&str; 15] = [
    "person",
    "chair",
    "sofa",
    "bed",
    "car",
    "bus",
    "truck",
    "bicycle",
    "table",
    "tv",
    "door",
    "refrigerator",
    "microwave",
    "oven",
    "sink",
];

#[derive(Debug, Deserialize, Default)]
struct ScanConfigFile {
    model: Option<ModelConfigFile>,
    labels: Option<LabelConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelConfigFile {
    path: Option<PathBuf>,
    input_size: Option<u32>,
    confidence: Option<f32>,
    iou: Option<f32>,
    max_detections: Option<usize>,
    class_names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct LabelConfigFile {
    keep: Option<Vec<String>>,
    door_open_width: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub model: ModelSettings,
    pub labels: LabelSettings,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub input_size: u32,
    pub confidence: f32,
    pub iou: f32,
    pub max_detections: usize,
    /// Custom class vocabulary in model output order; `None` means COCO-80.
    pub class_names: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct LabelSettings {
    pub keep: Vec<String>,
    pub door_open_width: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            keep: DEFAULT_KEY_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            door_open_width: DEFAULT_DOOR_OPEN_WIDTH,
        }
    }
}

impl ScanConfig {
    /// Load configuration: defaults, then the JSON file named by
    /// `SCENESCAN_CONFIG` (when set), then env overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SCENESCAN_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The class table in effect for the configured model.
    pub fn class_table(&self) -> ClassTable {
        match &self.model.class_names {
            Some(names) => ClassTable::from_names(names.clone()),
            None => ClassTable::coco(),
        }
    }

    fn from_file(file: ScanConfigFile) -> Self {
        let model = ModelSettings {
            path: file
                .model
                .as_ref()
                .and_then(|model| model.path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            input_size: file
                .model
                .as_ref()
                .and_then(|model| model.input_size)
                .unwrap_or(DEFAULT_INPUT_SIZE),
            confidence: file
                .model
                .as_ref()
                .and_then(|model| model.confidence)
                .unwrap_or(DEFAULT_CONFIDENCE),
            iou: file
                .model
                .as_ref()
                .and_then(|model| model.iou)
                .unwrap_or(DEFAULT_IOU),
            max_detections: file
                .model
                .as_ref()
                .and_then(|model| model.max_detections)
                .unwrap_or(DEFAULT_MAX_DETECTIONS),
            class_names: file.model.and_then(|model| model.class_names),
        };
        let labels = LabelSettings {
            keep: file
                .labels
                .as_ref()
                .and_then(|labels| labels.keep.clone())
                .unwrap_or_else(|| {
                    DEFAULT_KEY_LABELS
                        .iter()
                        .map(|label| label.to_string())
                        .collect()
                }),
            door_open_width: file
                .labels
                .and_then(|labels| labels.door_open_width)
                .unwrap_or(DEFAULT_DOOR_OPEN_WIDTH),
        };
        Self { model, labels }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("SCENESCAN_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.model.path = PathBuf::from(path);
            }
        }
        if let Ok(confidence) = std::env::var("SCENESCAN_CONFIDENCE") {
            let parsed: f32 = confidence
                .parse()
                .map_err(|_| anyhow!("SCENESCAN_CONFIDENCE must be a number"))?;
            self.model.confidence = parsed;
        }
        if let Ok(size) = std::env::var("SCENESCAN_INPUT_SIZE") {
            let parsed: u32 = size
                .parse()
                .map_err(|_| anyhow!("SCENESCAN_INPUT_SIZE must be an integer"))?;
            self.model.input_size = parsed;
        }
        if let Ok(labels) = std::env::var("SCENESCAN_KEY_LABELS") {
            let parsed = split_csv(&labels);
            if !parsed.is_empty() {
                self.labels.keep = parsed;
            }
        }
        if let Ok(width) = std::env::var("SCENESCAN_DOOR_OPEN_WIDTH") {
            let parsed: f32 = width
                .parse()
                .map_err(|_| anyhow!("SCENESCAN_DOOR_OPEN_WIDTH must be a number"))?;
            self.labels.door_open_width = parsed;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if !(self.model.confidence > 0.0 && self.model.confidence <= 1.0) {
            return Err(anyhow!("confidence threshold must be in (0, 1]"));
        }
        if !(self.model.iou > 0.0 && self.model.iou < 1.0) {
            return Err(anyhow!("iou threshold must be in (0, 1)"));
        }
        if self.model.input_size == 0 || self.model.input_size % 32 != 0 {
            return Err(anyhow!("model input size must be a positive multiple of 32"));
        }
        if self.model.max_detections == 0 {
            return Err(anyhow!("max detections must be greater than zero"));
        }
        if let Some(names) = &self.model.class_names {
            if names.is_empty() {
                return Err(anyhow!("class_names must not be empty when set"));
            }
        }
        if self.labels.keep.is_empty() {
            return Err(anyhow!("label allow-list must not be empty"));
        }
        self.labels.keep = self
            .labels
            .keep
            .iter()
            .map(|label| label.trim().to_lowercase())
            .collect();
        if !(self.labels.door_open_width > 0.0 && self.labels.door_open_width < 1.0) {
            return Err(anyhow!("door open width must be in (0, 1)"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ScanConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}
