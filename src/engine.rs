//! Measurement assembly: scale, geometry, quality, then a final validation
//! pass before anything is returned.
//!
//! The engine holds only its configuration. Each call is independent and
//! runs to completion or to a structured error; nothing is cached between
//! photographs.

use tracing::{debug, debug_span};

use crate::calibration::CalibrationObject;
use crate::config::{Bounds, EngineConfig};
use crate::error::{MeasurementError, Result};
use crate::geometry::FacialGeometry;
use crate::landmarks::{Landmark, LandmarkSet};
use crate::lighting::LightingEstimate;
use crate::quality;
use crate::result::{MeasurementField, MeasurementResult};
use crate::scale::resolve_scale;

#[derive(Debug, Clone, Default)]
pub struct MeasurementEngine {
    config: EngineConfig,
}

impl MeasurementEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Measure one photograph.
    ///
    /// Fails rather than returning a value outside the hard plausibility
    /// bounds: these numbers are used to grind lenses.
    pub fn compute(
        &self,
        landmarks: &LandmarkSet,
        calibration: &CalibrationObject,
        detection_confidence: f64,
        lighting: LightingEstimate,
    ) -> Result<MeasurementResult> {
        let _span = debug_span!("compute_measurement", calibration = %calibration.kind()).entered();

        if !(0.0..=1.0).contains(&detection_confidence) {
            return Err(MeasurementError::InvalidConfidence(detection_confidence));
        }
        landmarks.validate()?;

        let scale = resolve_scale(
            landmarks.require(Landmark::CalibrationStart)?,
            landmarks.require(Landmark::CalibrationEnd)?,
            calibration,
            &self.config.scale,
        )?;

        let geometry = FacialGeometry::compute(
            landmarks,
            &scale,
            self.config.quality.segment_height_face_fraction,
        )?;

        let report = quality::assess(
            &geometry,
            &scale,
            detection_confidence,
            lighting.condition(),
            &self.config.bounds.typical,
            &self.config.quality,
        );

        validate_hard_bounds(&geometry, &self.config.bounds.hard)?;

        debug!(
            pd = geometry.pupillary_distance_mm,
            quality = report.score,
            "measurement accepted"
        );

        Ok(MeasurementResult {
            pupillary_distance_mm: geometry.pupillary_distance_mm,
            monocular_pd_left_mm: geometry.monocular_pd_left_mm,
            monocular_pd_right_mm: geometry.monocular_pd_right_mm,
            optical_center_left: geometry.optical_center_left,
            optical_center_right: geometry.optical_center_right,
            segment_height_left: geometry.segment_height_left,
            segment_height_right: geometry.segment_height_right,
            face_width_mm: geometry.face_width_mm,
            face_height_mm: geometry.face_height_mm,
            nose_bridge_width_mm: geometry.nose_bridge_width_mm,
            pd_uncertainty_mm: report.pd_uncertainty_mm,
            mm_per_pixel: scale.mm_per_pixel(),
            measurement_quality: report.score,
            face_detection_confidence: detection_confidence,
            lighting_condition: report.lighting,
            quality_flags: report.flags,
        })
    }
}

/// Measure one photograph with the default configuration.
pub fn compute_measurement(
    landmarks: &LandmarkSet,
    calibration: &CalibrationObject,
    detection_confidence: f64,
    lighting: LightingEstimate,
) -> Result<MeasurementResult> {
    MeasurementEngine::default().compute(landmarks, calibration, detection_confidence, lighting)
}

/// Reject the first value outside its hard range, then the PD/monocular invariant.
fn validate_hard_bounds(geometry: &FacialGeometry, hard: &Bounds) -> Result<()> {
    let deviation = (MeasurementField::PdSumDeviation, geometry.pd_sum_deviation_mm());

    for (field, value) in geometry.fields().into_iter().chain(std::iter::once(deviation)) {
        let range = hard.range_for(field);
        if !range.contains(value) {
            return Err(MeasurementError::ImplausibleResult {
                field,
                value,
                min: range.min,
                max: range.max,
            });
        }
    }
    Ok(())
}
