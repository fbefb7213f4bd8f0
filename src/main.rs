use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use image::ImageReader;
use log::info;
use serde::Serialize;

use aerodefect::detection::{DEFAULT_DEFECT_CLASSES, DefectDetector, DetectorConfig};
use aerodefect::models::Detection;
use aerodefect::report;
use aerodefect::risk::{self, RiskTier};

#[derive(Parser)]
#[command(name = "aerodefect")]
#[command(about = "Detect exterior defects on aircraft photos")]
struct Cli {
    /// Path to input image file (JPEG or PNG)
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Path to the exported ONNX defect model
    #[arg(short, long, value_name = "MODEL", default_value = "models/defect.onnx")]
    model: PathBuf,

    /// Labels file with one class name per line (defaults to the built-in list)
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,

    /// Directory for annotated image and report artifacts
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Minimum raw model confidence in [0, 1] to keep a candidate
    #[arg(long, default_value_t = 0.25)]
    confidence: f32,

    /// Model input edge length in pixels
    #[arg(long, default_value_t = 640)]
    input_size: u32,

    /// Also write a PDF defect report
    #[arg(long)]
    report: bool,

    /// Also write detections and overall risk as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Shape of the optional JSON artifact.
#[derive(Serialize)]
struct JsonSummary<'a> {
    detections: &'a [Detection],
    overall_risk: RiskTier,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let labels = match &args.labels {
        Some(path) => load_labels(path)?,
        None => DEFAULT_DEFECT_CLASSES.iter().map(|s| s.to_string()).collect(),
    };

    // The model loads once, before any image is touched; failure here is
    // fatal rather than a per-request condition.
    let config = DetectorConfig::new()
        .with_input_size(args.input_size)
        .with_confidence_threshold(args.confidence);
    let detector = DefectDetector::load(&args.model, labels, config)?;

    let img = ImageReader::open(&args.image_path)
        .with_context(|| format!("failed to open image {}", args.image_path.display()))?
        .decode()
        .with_context(|| format!("failed to decode image {}", args.image_path.display()))?;

    let output = detector.detect(&img)?;
    let overall = risk::overall_risk(&output.detections);

    print_results(&output.detections, overall);

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;
    let stem = args
        .image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let annotated_path = args.output_dir.join(format!("{stem}.png"));
    output
        .annotated
        .save_with_format(&annotated_path, image::ImageFormat::Png)
        .with_context(|| format!("failed to save annotated image {}", annotated_path.display()))?;
    info!("annotated image written to {}", annotated_path.display());

    if args.json {
        let summary = JsonSummary {
            detections: &output.detections,
            overall_risk: overall,
        };
        let json_path = args.output_dir.join(format!("{stem}.json"));
        let bytes = serde_json::to_vec_pretty(&summary).context("failed to serialize detections")?;
        fs::write(&json_path, bytes)
            .with_context(|| format!("failed to write {}", json_path.display()))?;
        info!("detection summary written to {}", json_path.display());
    }

    if args.report {
        if output.detections.is_empty() {
            info!("no defects detected, skipping report");
        } else {
            let report_path = args.output_dir.join(format!("{stem}_report.pdf"));
            let bytes = report::render_report(&output.detections, overall)?;
            fs::write(&report_path, bytes)
                .with_context(|| format!("failed to write {}", report_path.display()))?;
            info!("defect report written to {}", report_path.display());
        }
    }

    Ok(())
}

fn print_results(detections: &[Detection], overall: RiskTier) {
    println!("\n=== Defect Detection Results ===");

    if detections.is_empty() {
        println!("No defects detected.");
    } else {
        println!("Total defects: {}\n", detections.len());
        for (i, detection) in detections.iter().enumerate() {
            let tier = RiskTier::from_confidence(detection.confidence);
            println!(
                "  {}. {} - {:.2}% - {} at ({:.0}, {:.0})..({:.0}, {:.0})",
                i + 1,
                detection.class_label,
                detection.confidence,
                tier.capitalized(),
                detection.bbox.x1,
                detection.bbox.y1,
                detection.bbox.x2,
                detection.bbox.y2,
            );
        }
    }

    println!("Overall risk: {}", overall.uppercased());
}

fn load_labels(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read labels file {}", path.display()))?;
    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    anyhow::ensure!(
        !labels.is_empty(),
        "labels file {} contains no class names",
        path.display()
    );

    Ok(labels)
}
