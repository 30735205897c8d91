//! CLI front end for optical measurements from detector output.
//!
//! Usage:
//!   facial-optics landmarks.json                         # Human-readable output
//!   facial-optics landmarks.json --json                  # JSON output
//!   facial-optics landmarks.json --image photo.jpg       # Estimate lighting from the photo
//!   facial-optics landmarks.json -o measurement.json     # Save to file

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use facial_optics::{
    estimate_lighting, CalibrationKind, CalibrationObject, EngineConfig, GrayImage,
    LandmarkSet, LightingCondition, LightingEstimate, MeasurementEngine, MeasurementResult,
    SegmentHeight,
};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "facial-optics")]
#[command(author, version, about = "Pupillary distance and lens fitting measurements", long_about = None)]
struct Args {
    /// Detector output (landmarks JSON)
    #[arg(required = true)]
    landmarks: PathBuf,

    /// Calibration object in the photo (credit-card, id-card, coin, ruler)
    #[arg(short, long, default_value = "credit-card")]
    calibration: String,

    /// Override the calibration object's real size in millimeters
    #[arg(long)]
    calibration_size: Option<f64>,

    /// Face detection confidence (overrides the value in the landmarks file)
    #[arg(long)]
    confidence: Option<f64>,

    /// Lighting classification from an upstream estimator
    #[arg(long, value_enum)]
    lighting: Option<LightingArg>,

    /// Photo to estimate lighting from when --lighting is not given
    #[arg(long)]
    image: Option<PathBuf>,

    /// Engine configuration (JSON, partial allowed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LightingArg {
    Good,
    Fair,
    Poor,
}

impl From<LightingArg> for LightingCondition {
    fn from(arg: LightingArg) -> Self {
        match arg {
            LightingArg::Good => LightingCondition::Good,
            LightingArg::Fair => LightingCondition::Fair,
            LightingArg::Poor => LightingCondition::Poor,
        }
    }
}

/// Landmark detector output as read from disk.
#[derive(Deserialize)]
struct DetectorOutput {
    #[serde(flatten)]
    landmarks: LandmarkSet,
    #[serde(default)]
    detection_confidence: Option<f64>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            info!(?path, "loading engine configuration");
            EngineConfig::from_json_file(path)?
        }
        None => EngineConfig::default(),
    };
    let engine = MeasurementEngine::new(config)?;

    let kind: CalibrationKind = args.calibration.parse()?;
    let calibration = match args.calibration_size {
        Some(mm) => CalibrationObject::with_size(kind, mm)?,
        None => CalibrationObject::standard(kind),
    };

    debug!(path = ?args.landmarks, "reading detector output");
    let detection: DetectorOutput =
        serde_json::from_reader(BufReader::new(File::open(&args.landmarks)?))?;

    let confidence = args
        .confidence
        .or(detection.detection_confidence)
        .ok_or("no detection confidence: pass --confidence or include detection_confidence")?;

    let lighting = resolve_lighting(args)?;
    debug!(condition = %lighting.condition(), "lighting resolved");

    let result = engine.compute(&detection.landmarks, &calibration, confidence, lighting)?;
    let presented = result.rounded();

    let output_str = if args.json {
        serde_json::to_string_pretty(&presented)?
    } else {
        format_human_readable(&presented, &calibration)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!(?path, "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn resolve_lighting(args: &Args) -> Result<LightingEstimate, Box<dyn std::error::Error>> {
    if let Some(label) = args.lighting {
        return Ok(LightingCondition::from(label).into());
    }
    if let Some(ref path) = args.image {
        return lighting_from_image(path);
    }
    // Fair caps a 0.95-confidence clean measurement at 0.90 quality; pass
    // --lighting or --image to reach the Good-lighting scores.
    debug!("no lighting information, assuming fair");
    Ok(LightingCondition::Fair.into())
}

fn lighting_from_image(path: &Path) -> Result<LightingEstimate, Box<dyn std::error::Error>> {
    debug!(?path, "estimating lighting from image");
    let luma = image::open(path)?.to_luma8();
    let (width, height) = luma.dimensions();
    let gray = GrayImage::new(luma.into_raw(), width, height);
    Ok(estimate_lighting(&gray))
}

fn format_segment(segment: &SegmentHeight) -> String {
    match segment {
        SegmentHeight::Measured(mm) => format!("{:.1} mm", mm),
        SegmentHeight::Estimated(mm) => format!("{:.1} mm (est.)", mm),
    }
}

fn format_human_readable(r: &MeasurementResult, calibration: &CalibrationObject) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Calibration: {} ({:.2} mm), {:.4} mm/px\n",
        calibration.kind(),
        calibration.real_size_mm(),
        r.mm_per_pixel
    ));

    s.push_str("\nPupillary distance:\n");
    s.push_str(&format!(
        "  Binocular: {:.1} mm (±{:.1})\n",
        r.pupillary_distance_mm, r.pd_uncertainty_mm
    ));
    s.push_str(&format!(
        "  Monocular: L {:.1} mm, R {:.1} mm\n",
        r.monocular_pd_left_mm, r.monocular_pd_right_mm
    ));

    s.push_str("\nOptical centers (nasal, up):\n");
    s.push_str(&format!(
        "  Left:  {:+.1} mm, {:+.1} mm\n",
        r.optical_center_left.x_mm, r.optical_center_left.y_mm
    ));
    s.push_str(&format!(
        "  Right: {:+.1} mm, {:+.1} mm\n",
        r.optical_center_right.x_mm, r.optical_center_right.y_mm
    ));

    s.push_str("\nSegment height:\n");
    s.push_str(&format!("  Left:  {}\n", format_segment(&r.segment_height_left)));
    s.push_str(&format!("  Right: {}\n", format_segment(&r.segment_height_right)));

    s.push_str("\nFace:\n");
    s.push_str(&format!("  Width:       {:.1} mm\n", r.face_width_mm));
    s.push_str(&format!("  Height:      {:.1} mm\n", r.face_height_mm));
    s.push_str(&format!("  Nose bridge: {:.1} mm\n", r.nose_bridge_width_mm));

    s.push_str("\nQuality:\n");
    s.push_str(&format!("  Score:      {:.2}\n", r.measurement_quality));
    s.push_str(&format!("  Detection:  {:.2}\n", r.face_detection_confidence));
    s.push_str(&format!("  Lighting:   {}\n", r.lighting_condition));
    for flag in &r.quality_flags {
        s.push_str(&format!("  Flag:       {:?}\n", flag));
    }

    s
}
