//! scenescan - run a pretrained detector on an image and write the
//! normalized JSON scene report
//!
//! Pipeline:
//! 1. Decode the input image and record its dimensions
//! 2. Run the configured detector backend over the pixels
//! 3. Filter/normalize/relabel detections into report entries
//! 4. Write the report to the output file and print it to stdout

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

use scenescan::{
    load_image, render_report, scan_frame, write_report, BackendRegistry, ScanConfig, StubBackend,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path.
    image: PathBuf,
    /// Output JSON path.
    output: PathBuf,
    /// Confidence threshold override.
    #[arg(long)]
    conf: Option<f32>,
    /// ONNX model path override.
    #[arg(long)]
    model: Option<PathBuf>,
    /// Detector backend name (defaults to the model backend when compiled in).
    #[arg(long)]
    backend: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = ScanConfig::load()?;
    if let Some(conf) = args.conf {
        if !(conf > 0.0 && conf <= 1.0) {
            return Err(anyhow!("--conf must be in (0, 1]"));
        }
        cfg.model.confidence = conf;
    }
    if let Some(model) = args.model {
        cfg.model.path = model;
    }

    let frame = load_image(&args.image)?;
    log::info!(
        "loaded {} ({}x{})",
        args.image.display(),
        frame.width,
        frame.height
    );

    let registry = build_registry(&cfg, args.backend.as_deref())?;
    let report = scan_frame(&registry, args.backend.as_deref(), &frame, &cfg)?;
    log::info!("{} detections kept after filtering", report.len());

    write_report(&args.output, &report)?;
    println!("{}", render_report(&report)?);
    log::info!("detections saved to {}", args.output.display());

    Ok(())
}

/// Assemble the backend registry for this run.
///
/// The model backend is skipped when the caller explicitly asked for the
/// stub, so stub runs work without a model file on disk.
fn build_registry(cfg: &ScanConfig, backend: Option<&str>) -> Result<BackendRegistry> {
    let mut registry = BackendRegistry::new();

    #[cfg(feature = "backend-tract")]
    if backend != Some("stub") {
        let tract = scenescan::TractBackend::new(&cfg.model.path, cfg.model.input_size)?
            .with_threshold(cfg.model.confidence)
            .with_iou(cfg.model.iou)
            .with_max_detections(cfg.model.max_detections);
        registry.register(tract);
        log::info!(
            "model backend ready: {} (input {}x{})",
            cfg.model.path.display(),
            cfg.model.input_size,
            cfg.model.input_size
        );
    }
    #[cfg(not(feature = "backend-tract"))]
    let _ = (cfg, backend);

    registry.register(StubBackend::new());
    Ok(registry)
}
