//! Detector output: pixel-space facial and calibration landmarks.
//!
//! Every point is optional because the external detector may fail to find
//! it. The engine decides which absences are fatal; only the lower-frame
//! points may be missing without failing the measurement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MeasurementError, Result};
use crate::types::{BoundingBox, Point};

/// Names of the individual landmarks, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    LeftPupil,
    RightPupil,
    LeftEyeInnerCorner,
    LeftEyeOuterCorner,
    RightEyeInnerCorner,
    RightEyeOuterCorner,
    NoseBridgeLeft,
    NoseBridgeRight,
    FaceTopLeft,
    FaceBottomRight,
    CalibrationStart,
    CalibrationEnd,
    LowerFrameLeft,
    LowerFrameRight,
}

impl Landmark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Landmark::LeftPupil => "left_pupil",
            Landmark::RightPupil => "right_pupil",
            Landmark::LeftEyeInnerCorner => "left_eye_inner_corner",
            Landmark::LeftEyeOuterCorner => "left_eye_outer_corner",
            Landmark::RightEyeInnerCorner => "right_eye_inner_corner",
            Landmark::RightEyeOuterCorner => "right_eye_outer_corner",
            Landmark::NoseBridgeLeft => "nose_bridge_left",
            Landmark::NoseBridgeRight => "nose_bridge_right",
            Landmark::FaceTopLeft => "face_top_left",
            Landmark::FaceBottomRight => "face_bottom_right",
            Landmark::CalibrationStart => "calibration_start",
            Landmark::CalibrationEnd => "calibration_end",
            Landmark::LowerFrameLeft => "lower_frame_left",
            Landmark::LowerFrameRight => "lower_frame_right",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Landmarks for one photograph. "Left" and "right" refer to the subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub image_width: u32,
    pub image_height: u32,

    #[serde(default)]
    pub left_pupil: Option<Point>,
    #[serde(default)]
    pub right_pupil: Option<Point>,

    #[serde(default)]
    pub left_eye_inner_corner: Option<Point>,
    #[serde(default)]
    pub left_eye_outer_corner: Option<Point>,
    #[serde(default)]
    pub right_eye_inner_corner: Option<Point>,
    #[serde(default)]
    pub right_eye_outer_corner: Option<Point>,

    #[serde(default)]
    pub nose_bridge_left: Option<Point>,
    #[serde(default)]
    pub nose_bridge_right: Option<Point>,

    /// Opposite corners of the face bounding box.
    #[serde(default)]
    pub face_top_left: Option<Point>,
    #[serde(default)]
    pub face_bottom_right: Option<Point>,

    /// Extreme points of the calibration object's known edge.
    #[serde(default)]
    pub calibration_start: Option<Point>,
    #[serde(default)]
    pub calibration_end: Option<Point>,

    /// Lowest point of the frame rim (or lower lid reference) below each pupil.
    #[serde(default)]
    pub lower_frame_left: Option<Point>,
    #[serde(default)]
    pub lower_frame_right: Option<Point>,
}

impl LandmarkSet {
    pub fn get(&self, landmark: Landmark) -> Option<Point> {
        match landmark {
            Landmark::LeftPupil => self.left_pupil,
            Landmark::RightPupil => self.right_pupil,
            Landmark::LeftEyeInnerCorner => self.left_eye_inner_corner,
            Landmark::LeftEyeOuterCorner => self.left_eye_outer_corner,
            Landmark::RightEyeInnerCorner => self.right_eye_inner_corner,
            Landmark::RightEyeOuterCorner => self.right_eye_outer_corner,
            Landmark::NoseBridgeLeft => self.nose_bridge_left,
            Landmark::NoseBridgeRight => self.nose_bridge_right,
            Landmark::FaceTopLeft => self.face_top_left,
            Landmark::FaceBottomRight => self.face_bottom_right,
            Landmark::CalibrationStart => self.calibration_start,
            Landmark::CalibrationEnd => self.calibration_end,
            Landmark::LowerFrameLeft => self.lower_frame_left,
            Landmark::LowerFrameRight => self.lower_frame_right,
        }
    }

    /// A landmark that must be present; absence is reported, never defaulted.
    pub fn require(&self, landmark: Landmark) -> Result<Point> {
        self.get(landmark)
            .ok_or(MeasurementError::InsufficientLandmarks { missing: landmark })
    }

    pub fn face_box(&self) -> Result<BoundingBox> {
        Ok(BoundingBox::from_corners(
            self.require(Landmark::FaceTopLeft)?,
            self.require(Landmark::FaceBottomRight)?,
        ))
    }

    /// Check every present point lies inside the image and the pupils are distinct.
    ///
    /// Missing points are not an error here; they are reported by [`require`]
    /// at the stage that needs them.
    ///
    /// [`require`]: LandmarkSet::require
    pub fn validate(&self) -> Result<()> {
        let width = f64::from(self.image_width);
        let height = f64::from(self.image_height);

        for landmark in ALL_LANDMARKS {
            let Some(p) = self.get(landmark) else {
                continue;
            };
            let inside = p.is_finite() && p.x >= 0.0 && p.y >= 0.0 && p.x <= width && p.y <= height;
            if !inside {
                return Err(MeasurementError::LandmarkOutOfBounds {
                    landmark,
                    x: p.x,
                    y: p.y,
                    width: self.image_width,
                    height: self.image_height,
                });
            }
        }

        if let (Some(left), Some(right)) = (self.left_pupil, self.right_pupil) {
            let distance_px = left.distance(&right);
            if distance_px <= f64::EPSILON {
                return Err(MeasurementError::CoincidentPupils { distance_px });
            }
        }

        Ok(())
    }
}

const ALL_LANDMARKS: [Landmark; 14] = [
    Landmark::LeftPupil,
    Landmark::RightPupil,
    Landmark::LeftEyeInnerCorner,
    Landmark::LeftEyeOuterCorner,
    Landmark::RightEyeInnerCorner,
    Landmark::RightEyeOuterCorner,
    Landmark::NoseBridgeLeft,
    Landmark::NoseBridgeRight,
    Landmark::FaceTopLeft,
    Landmark::FaceBottomRight,
    Landmark::CalibrationStart,
    Landmark::CalibrationEnd,
    Landmark::LowerFrameLeft,
    Landmark::LowerFrameRight,
];
