//! model_probe - smoke-check a detection model against a single image
//!
//! Prints one `label: confidence` line per raw detection, with no
//! allow-list filtering or report shaping. Useful for verifying a model
//! artifact before wiring it into the scan pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use scenescan::{load_image, ClassTable, DetectorBackend, TractBackend};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path.
    image: PathBuf,
    /// ONNX model path.
    #[arg(long, default_value = "yolov8n.onnx")]
    model: PathBuf,
    /// Confidence threshold.
    #[arg(long, default_value_t = 0.25)]
    conf: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let frame = load_image(&args.image)?;
    log::info!(
        "probing {} ({}x{}) with {}",
        args.image.display(),
        frame.width,
        frame.height,
        args.model.display()
    );

    let mut backend = TractBackend::new(&args.model, 640)?.with_threshold(args.conf);
    let detections = backend.detect(frame.pixels(), frame.width, frame.height)?;

    let classes = ClassTable::coco();
    for det in &detections {
        let label = classes.name(det.class_id).unwrap_or("unknown");
        println!("{}: {:.2}", label, det.confidence);
    }
    log::info!("{} detections above threshold", detections.len());

    Ok(())
}
