//! Measurement quality scoring.
//!
//! The score starts from a weighted mix of detection confidence and lighting,
//! then every failed check multiplies it by `check_penalty` and an estimated
//! segment height multiplies it by `fallback_penalty`. Improving any single
//! input never lowers the score.

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Bounds, QualityWeights};
use crate::geometry::FacialGeometry;
use crate::lighting::LightingCondition;
use crate::result::MeasurementField;
use crate::scale::ScaleFactor;

/// A quality check that did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "check", content = "field", rename_all = "snake_case")]
pub enum QualityFlag {
    /// Binocular PD and the monocular sum disagree beyond the typical tolerance.
    PdSumDeviation,
    /// A value lies outside its typical adult range.
    AtypicalValue(MeasurementField),
    /// Propagated landmark noise makes the PD less precise than allowed.
    HighUncertainty,
    /// At least one segment height was approximated from face height.
    SegmentHeightEstimated,
}

impl QualityFlag {
    /// Fallback usage has its own penalty; everything else is a failed check.
    pub fn is_failed_check(&self) -> bool {
        !matches!(self, QualityFlag::SegmentHeightEstimated)
    }
}

/// Everything the score depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityInputs {
    pub detection_confidence: f64,
    pub lighting: LightingCondition,
    pub failed_checks: usize,
    pub fallback_used: bool,
}

/// Quality score in [0, 1].
pub fn quality_score(inputs: &QualityInputs, weights: &QualityWeights) -> f64 {
    let lighting = match inputs.lighting {
        LightingCondition::Good => weights.good_lighting_score,
        LightingCondition::Fair => weights.fair_lighting_score,
        LightingCondition::Poor => weights.poor_lighting_score,
    };
    let confidence = inputs.detection_confidence.clamp(0.0, 1.0);

    let total_weight = weights.confidence_weight + weights.lighting_weight;
    let mut score =
        (weights.confidence_weight * confidence + weights.lighting_weight * lighting) / total_weight;

    let failed = i32::try_from(inputs.failed_checks).unwrap_or(i32::MAX);
    score *= weights.check_penalty.powi(failed);
    if inputs.fallback_used {
        score *= weights.fallback_penalty;
    }

    score.clamp(0.0, 1.0)
}

/// One-sigma PD uncertainty in millimeters.
///
/// Each landmark is assumed to carry independent isotropic noise of
/// `noise_px`, so a two-point distance `d` has relative error `sqrt(2) * noise / d`.
/// The pupil span and the calibration span contribute in quadrature.
pub fn pd_uncertainty_mm(pd_mm: f64, scale: &ScaleFactor, noise_px: f64) -> f64 {
    let pupil_px = pd_mm / scale.mm_per_pixel();
    let calibration_px = scale.calibration_px();
    let relative = SQRT_2
        * noise_px
        * ((1.0 / pupil_px).powi(2) + (1.0 / calibration_px).powi(2)).sqrt();
    pd_mm * relative
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub score: f64,
    pub lighting: LightingCondition,
    pub pd_uncertainty_mm: f64,
    pub flags: Vec<QualityFlag>,
}

/// Run the consistency, plausibility and precision checks and score the result.
pub fn assess(
    geometry: &FacialGeometry,
    scale: &ScaleFactor,
    detection_confidence: f64,
    lighting: LightingCondition,
    typical: &Bounds,
    weights: &QualityWeights,
) -> QualityReport {
    let mut flags = Vec::new();

    if geometry.pd_sum_deviation_mm() > typical.max_pd_sum_deviation_mm {
        flags.push(QualityFlag::PdSumDeviation);
    }

    for (field, value) in geometry.fields() {
        if !typical.range_for(field).contains(value) {
            flags.push(QualityFlag::AtypicalValue(field));
        }
    }

    let pd_uncertainty_mm = pd_uncertainty_mm(
        geometry.pupillary_distance_mm,
        scale,
        weights.landmark_noise_px,
    );
    if pd_uncertainty_mm > weights.max_pd_uncertainty_mm {
        flags.push(QualityFlag::HighUncertainty);
    }

    let fallback_used = geometry.uses_segment_fallback();
    if fallback_used {
        flags.push(QualityFlag::SegmentHeightEstimated);
    }

    let inputs = QualityInputs {
        detection_confidence,
        lighting,
        failed_checks: flags.iter().filter(|f| f.is_failed_check()).count(),
        fallback_used,
    };
    let score = quality_score(&inputs, weights);

    if inputs.failed_checks > 0 {
        warn!(?flags, score, "measurement failed quality checks");
    }
    debug!(
        score,
        detection_confidence,
        %lighting,
        pd_uncertainty_mm,
        "assessed measurement quality"
    );

    QualityReport {
        score,
        lighting,
        pd_uncertainty_mm,
        flags,
    }
}
