//! The finished measurement record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{OpticalCenterOffset, SegmentHeight};
use crate::lighting::LightingCondition;
use crate::quality::QualityFlag;

/// Names of bounded outputs, used by quality flags and `ImplausibleResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementField {
    PupillaryDistance,
    MonocularPdLeft,
    MonocularPdRight,
    OpticalCenterLeftX,
    OpticalCenterLeftY,
    OpticalCenterRightX,
    OpticalCenterRightY,
    SegmentHeightLeft,
    SegmentHeightRight,
    FaceWidth,
    FaceHeight,
    NoseBridgeWidth,
    /// |PD - (monocular left + monocular right)|
    PdSumDeviation,
}

impl MeasurementField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementField::PupillaryDistance => "pupillary_distance",
            MeasurementField::MonocularPdLeft => "monocular_pd_left",
            MeasurementField::MonocularPdRight => "monocular_pd_right",
            MeasurementField::OpticalCenterLeftX => "optical_center_left_x",
            MeasurementField::OpticalCenterLeftY => "optical_center_left_y",
            MeasurementField::OpticalCenterRightX => "optical_center_right_x",
            MeasurementField::OpticalCenterRightY => "optical_center_right_y",
            MeasurementField::SegmentHeightLeft => "segment_height_left",
            MeasurementField::SegmentHeightRight => "segment_height_right",
            MeasurementField::FaceWidth => "face_width",
            MeasurementField::FaceHeight => "face_height",
            MeasurementField::NoseBridgeWidth => "nose_bridge_width",
            MeasurementField::PdSumDeviation => "pd_sum_deviation",
        }
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optical measurements for one photograph. All distances are in millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
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

    /// One-sigma PD uncertainty propagated from landmark noise.
    pub pd_uncertainty_mm: f64,
    pub mm_per_pixel: f64,

    pub measurement_quality: f64,
    pub face_detection_confidence: f64,
    pub lighting_condition: LightingCondition,
    pub quality_flags: Vec<QualityFlag>,
}

impl MeasurementResult {
    pub fn segment_height_estimated(&self) -> bool {
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

    /// |PD - (monocular left + monocular right)|.
    pub fn pd_sum_deviation_mm(&self) -> f64 {
        (self.pupillary_distance_mm - (self.monocular_pd_left_mm + self.monocular_pd_right_mm)).abs()
    }

    /// Copy for display: distances to 0.1 mm, scores to 0.01.
    ///
    /// `mm_per_pixel` is left untouched; rounding it would be meaningless.
    pub fn rounded(&self) -> Self {
        let offset = |o: OpticalCenterOffset| OpticalCenterOffset {
            x_mm: round_to(o.x_mm, 1),
            y_mm: round_to(o.y_mm, 1),
        };
        let segment = |s: SegmentHeight| match s {
            SegmentHeight::Measured(mm) => SegmentHeight::Measured(round_to(mm, 1)),
            SegmentHeight::Estimated(mm) => SegmentHeight::Estimated(round_to(mm, 1)),
        };

        Self {
            pupillary_distance_mm: round_to(self.pupillary_distance_mm, 1),
            monocular_pd_left_mm: round_to(self.monocular_pd_left_mm, 1),
            monocular_pd_right_mm: round_to(self.monocular_pd_right_mm, 1),
            optical_center_left: offset(self.optical_center_left),
            optical_center_right: offset(self.optical_center_right),
            segment_height_left: segment(self.segment_height_left),
            segment_height_right: segment(self.segment_height_right),
            face_width_mm: round_to(self.face_width_mm, 1),
            face_height_mm: round_to(self.face_height_mm, 1),
            nose_bridge_width_mm: round_to(self.nose_bridge_width_mm, 1),
            pd_uncertainty_mm: round_to(self.pd_uncertainty_mm, 1),
            mm_per_pixel: self.mm_per_pixel,
            measurement_quality: round_to(self.measurement_quality, 2),
            face_detection_confidence: round_to(self.face_detection_confidence, 2),
            lighting_condition: self.lighting_condition,
            quality_flags: self.quality_flags.clone(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
