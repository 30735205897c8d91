//! Optical distances from calibrated facial landmarks.
//!
//! All inputs are in pixels; every output is converted to millimeters with the
//! photograph's [`ScaleFactor`]. Nothing is rounded here.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::landmarks::{Landmark, LandmarkSet};
use crate::result::MeasurementField;
use crate::scale::ScaleFactor;
use crate::types::Point;

/// Pupil displacement from the eye-corner midpoint, in millimeters.
///
/// `x` is positive toward the nose, `y` is positive upward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OpticalCenterOffset {
    pub x_mm: f64,
    pub y_mm: f64,
}

/// Segment height for one eye, tagged with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "mm", rename_all = "snake_case")]
pub enum SegmentHeight {
    /// Measured from a detected lower-frame landmark.
    Measured(f64),
    /// Approximated as a fraction of face height.
    Estimated(f64),
}

impl SegmentHeight {
    pub fn mm(&self) -> f64 {
        match *self {
            SegmentHeight::Measured(mm) | SegmentHeight::Estimated(mm) => mm,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, SegmentHeight::Estimated(_))
    }
}

/// Raw geometric outputs before quality assessment and final validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FacialGeometry {
    pub pupillary_distance_mm: f64,
    pub monocular_pd_left_mm: f64,
    pub monocular_pd_right_mm: f64,
    pub optical_center_left: OpticalCenterOffset,
    pub optical_center_right: OpticalCenterOffset,
    pub segment_height_left: SegmentHeight,
    pub segment_height_right: SegmentHeight,
    pub face_width_mm: f64,
    pub face_height_mm: f64,
    pub nose_bridge_width_mm: f64,
}

impl FacialGeometry {
    /// Compute every distance from the landmarks.
    ///
    /// Fails with `InsufficientLandmarks` if any point other than the
    /// lower-frame references is missing. A missing lower-frame point makes
    /// that eye's segment height fall back to
    /// `segment_height_face_fraction * face_height`.
    pub fn compute(
        landmarks: &LandmarkSet,
        scale: &ScaleFactor,
        segment_height_face_fraction: f64,
    ) -> Result<Self> {
        let left_pupil = landmarks.require(Landmark::LeftPupil)?;
        let right_pupil = landmarks.require(Landmark::RightPupil)?;
        let left_eye = eye_center(
            landmarks.require(Landmark::LeftEyeInnerCorner)?,
            landmarks.require(Landmark::LeftEyeOuterCorner)?,
        );
        let right_eye = eye_center(
            landmarks.require(Landmark::RightEyeInnerCorner)?,
            landmarks.require(Landmark::RightEyeOuterCorner)?,
        );
        let bridge_left = landmarks.require(Landmark::NoseBridgeLeft)?;
        let bridge_right = landmarks.require(Landmark::NoseBridgeRight)?;
        let face = landmarks.face_box()?;

        // Vertical reference through the middle of the pupil segment. The face
        // box center is not used: facial asymmetry shifts it.
        let midline_x = left_pupil.midpoint(&right_pupil).x;

        let face_height_mm = scale.to_mm(face.height);
        let segment_fallback_mm = face_height_mm * segment_height_face_fraction;

        let segment_height_left = segment_height(
            left_pupil,
            landmarks.get(Landmark::LowerFrameLeft),
            scale,
            segment_fallback_mm,
        );
        let segment_height_right = segment_height(
            right_pupil,
            landmarks.get(Landmark::LowerFrameRight),
            scale,
            segment_fallback_mm,
        );
        if segment_height_left.is_estimated() || segment_height_right.is_estimated() {
            warn!(
                left_estimated = segment_height_left.is_estimated(),
                right_estimated = segment_height_right.is_estimated(),
                fallback_mm = segment_fallback_mm,
                "no lower-frame landmark, segment height approximated from face height"
            );
        }

        let geometry = Self {
            pupillary_distance_mm: scale.distance_mm(&left_pupil, &right_pupil),
            monocular_pd_left_mm: scale.to_mm((left_pupil.x - midline_x).abs()),
            monocular_pd_right_mm: scale.to_mm((right_pupil.x - midline_x).abs()),
            optical_center_left: optical_center(left_pupil, left_eye, midline_x, scale),
            optical_center_right: optical_center(right_pupil, right_eye, midline_x, scale),
            segment_height_left,
            segment_height_right,
            face_width_mm: scale.to_mm(face.width),
            face_height_mm,
            nose_bridge_width_mm: scale.distance_mm(&bridge_left, &bridge_right),
        };

        debug!(
            pd = geometry.pupillary_distance_mm,
            mono_left = geometry.monocular_pd_left_mm,
            mono_right = geometry.monocular_pd_right_mm,
            face_width = geometry.face_width_mm,
            face_height = geometry.face_height_mm,
            bridge = geometry.nose_bridge_width_mm,
            "computed facial geometry"
        );

        Ok(geometry)
    }

    pub fn monocular_sum_mm(&self) -> f64 {
        self.monocular_pd_left_mm + self.monocular_pd_right_mm
    }

    /// |binocular PD - (left + right monocular PD)|.
    ///
    /// Zero when the pupils are level; grows with head roll.
    pub fn pd_sum_deviation_mm(&self) -> f64 {
        (self.pupillary_distance_mm - self.monocular_sum_mm()).abs()
    }

    pub fn uses_segment_fallback(&self) -> bool {
        self.segment_height_left.is_estimated() || self.segment_height_right.is_estimated()
    }

    /// Every individually bounded output, paired with its name.
    pub fn fields(&self) -> [(MeasurementField, f64); 12] {
        [
            (MeasurementField::PupillaryDistance, self.pupillary_distance_mm),
            (MeasurementField::MonocularPdLeft, self.monocular_pd_left_mm),
            (MeasurementField::MonocularPdRight, self.monocular_pd_right_mm),
            (MeasurementField::OpticalCenterLeftX, self.optical_center_left.x_mm),
            (MeasurementField::OpticalCenterLeftY, self.optical_center_left.y_mm),
            (MeasurementField::OpticalCenterRightX, self.optical_center_right.x_mm),
            (MeasurementField::OpticalCenterRightY, self.optical_center_right.y_mm),
            (MeasurementField::SegmentHeightLeft, self.segment_height_left.mm()),
            (MeasurementField::SegmentHeightRight, self.segment_height_right.mm()),
            (MeasurementField::FaceWidth, self.face_width_mm),
            (MeasurementField::FaceHeight, self.face_height_mm),
            (MeasurementField::NoseBridgeWidth, self.nose_bridge_width_mm),
        ]
    }
}

fn eye_center(inner: Point, outer: Point) -> Point {
    inner.midpoint(&outer)
}

fn optical_center(
    pupil: Point,
    eye_center: Point,
    midline_x: f64,
    scale: &ScaleFactor,
) -> OpticalCenterOffset {
    let delta = pupil - eye_center;
    // Eyes left of the midline in the image have the nose toward +x.
    let nasal = if eye_center.x <= midline_x { 1.0 } else { -1.0 };
    OpticalCenterOffset {
        x_mm: scale.to_mm(nasal * delta.x),
        // Image y grows downward.
        y_mm: scale.to_mm(-delta.y),
    }
}

fn segment_height(
    pupil: Point,
    lower_frame: Option<Point>,
    scale: &ScaleFactor,
    fallback_mm: f64,
) -> SegmentHeight {
    match lower_frame {
        // Signed: a frame point detected above the pupil yields a negative
        // height, which the hard bounds reject.
        Some(frame) => SegmentHeight::Measured(scale.to_mm(frame.y - pupil.y)),
        None => SegmentHeight::Estimated(fallback_mm),
    }
}
