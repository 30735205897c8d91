use thiserror::Error;

use crate::landmarks::Landmark;
use crate::result::MeasurementField;

#[derive(Error, Debug)]
pub enum MeasurementError {
    #[error("unknown calibration object kind: {0:?}")]
    UnknownCalibrationKind(String),

    #[error("invalid calibration object size: {0} mm (must be finite and positive)")]
    InvalidCalibrationSize(f64),

    #[error(
        "degenerate calibration: object spans {pixel_distance:.2}px, at least {min_pixels:.2}px required"
    )]
    DegenerateCalibration { pixel_distance: f64, min_pixels: f64 },

    #[error("implausible scale: {mm_per_pixel:.4} mm/px outside [{min}, {max}]")]
    ImplausibleScale {
        mm_per_pixel: f64,
        min: f64,
        max: f64,
    },

    #[error("insufficient landmarks: {missing} not detected")]
    InsufficientLandmarks { missing: Landmark },

    #[error("landmark {landmark} at ({x}, {y}) out of bounds for {width}x{height} image")]
    LandmarkOutOfBounds {
        landmark: Landmark,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },

    #[error("pupil centers are coincident ({distance_px:.3}px apart)")]
    CoincidentPupils { distance_px: f64 },

    #[error("detection confidence {0} outside [0, 1]")]
    InvalidConfidence(f64),

    #[error("implausible result: {field} = {value:.2} outside [{min}, {max}]")]
    ImplausibleResult {
        field: MeasurementField,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MeasurementError>;
