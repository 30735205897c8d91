//! Pixel-to-millimeter conversion from a detected calibration object.

use serde::Serialize;
use tracing::debug;

use crate::calibration::CalibrationObject;
use crate::config::ScaleLimits;
use crate::error::{MeasurementError, Result};
use crate::types::Point;

/// Millimeters per pixel for one photograph.
///
/// Only valid for the image it was resolved from: camera distance and zoom
/// differ between shots, so a scale is never reused across measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactor {
    mm_per_pixel: f64,
    /// Detected span of the calibration edge.
    calibration_px: f64,
}

impl ScaleFactor {
    pub fn mm_per_pixel(&self) -> f64 {
        self.mm_per_pixel
    }

    pub fn calibration_px(&self) -> f64 {
        self.calibration_px
    }

    pub fn to_mm(&self, pixels: f64) -> f64 {
        pixels * self.mm_per_pixel
    }

    /// Pixel distance between two points, converted to millimeters.
    pub fn distance_mm(&self, a: &Point, b: &Point) -> f64 {
        self.to_mm(a.distance(b))
    }
}

/// Resolve the scale from the calibration object's two extreme points.
pub fn resolve_scale(
    start: Point,
    end: Point,
    object: &CalibrationObject,
    limits: &ScaleLimits,
) -> Result<ScaleFactor> {
    let pixel_distance = start.distance(&end);
    if !pixel_distance.is_finite() || pixel_distance < limits.min_calibration_px {
        return Err(MeasurementError::DegenerateCalibration {
            pixel_distance,
            min_pixels: limits.min_calibration_px,
        });
    }

    let mm_per_pixel = object.real_size_mm() / pixel_distance;
    if mm_per_pixel < limits.min_mm_per_pixel || mm_per_pixel > limits.max_mm_per_pixel {
        return Err(MeasurementError::ImplausibleScale {
            mm_per_pixel,
            min: limits.min_mm_per_pixel,
            max: limits.max_mm_per_pixel,
        });
    }

    debug!(
        kind = %object.kind(),
        pixel_distance,
        mm_per_pixel,
        "resolved calibration scale"
    );

    Ok(ScaleFactor {
        mm_per_pixel,
        calibration_px: pixel_distance,
    })
}
