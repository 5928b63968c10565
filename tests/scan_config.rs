use std::sync::Mutex;

use tempfile::NamedTempFile;

use scenescan::ScanConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "SCENESCAN_CONFIG",
        "SCENESCAN_MODEL_PATH",
        "SCENESCAN_CONFIDENCE",
        "SCENESCAN_INPUT_SIZE",
        "SCENESCAN_KEY_LABELS",
        "SCENESCAN_DOOR_OPEN_WIDTH",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_config() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ScanConfig::load().expect("load config");
    assert_eq!(cfg.model.path.to_str(), Some("yolov8m.onnx"));
    assert_eq!(cfg.model.input_size, 640);
    assert_eq!(cfg.model.confidence, 0.35);
    assert_eq!(cfg.model.iou, 0.45);
    assert_eq!(cfg.model.max_detections, 300);
    assert!(cfg.model.class_names.is_none());
    assert_eq!(cfg.labels.keep.len(), 15);
    assert!(cfg.labels.keep.iter().any(|label| label == "door"));
    assert_eq!(cfg.labels.door_open_width, 0.3);
    assert_eq!(cfg.class_table().len(), 80);
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "model": {
            "path": "models/doors.onnx",
            "input_size": 416,
            "confidence": 0.5,
            "class_names": ["door", "window"]
        },
        "labels": {
            "keep": ["Door", "window"],
            "door_open_width": 0.25
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("SCENESCAN_CONFIG", file.path());
    std::env::set_var("SCENESCAN_CONFIDENCE", "0.6");
    std::env::set_var("SCENESCAN_KEY_LABELS", "door, person");

    let cfg = ScanConfig::load().expect("load config");
    // File values survive where no env override exists.
    assert_eq!(cfg.model.path.to_str(), Some("models/doors.onnx"));
    assert_eq!(cfg.model.input_size, 416);
    assert_eq!(cfg.labels.door_open_width, 0.25);
    assert_eq!(cfg.class_table().len(), 2);
    // Env wins over file.
    assert_eq!(cfg.model.confidence, 0.6);
    assert_eq!(cfg.labels.keep, vec!["door".to_string(), "person".to_string()]);

    clear_env();
}

#[test]
fn allow_list_is_lowercased() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SCENESCAN_KEY_LABELS", "Person,TV");
    let cfg = ScanConfig::load().expect("load config");
    assert_eq!(cfg.labels.keep, vec!["person".to_string(), "tv".to_string()]);

    clear_env();
}

#[test]
fn rejects_out_of_range_confidence() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SCENESCAN_CONFIDENCE", "1.5");
    let err = ScanConfig::load().unwrap_err();
    assert!(err.to_string().contains("confidence"));

    clear_env();
}

#[test]
fn rejects_non_numeric_confidence() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SCENESCAN_CONFIDENCE", "high");
    let err = ScanConfig::load().unwrap_err();
    assert!(err.to_string().contains("SCENESCAN_CONFIDENCE"));

    clear_env();
}

#[test]
fn rejects_unaligned_input_size() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SCENESCAN_INPUT_SIZE", "100");
    let err = ScanConfig::load().unwrap_err();
    assert!(err.to_string().contains("multiple of 32"));

    clear_env();
}
