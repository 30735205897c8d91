//! Engine configuration: scale limits, plausibility bounds and quality weights.
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides. That includes single ranges inside `bounds.hard` and
//! `bounds.typical`: the rest of the tier keeps its built-in values.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MeasurementError, Result};
use crate::result::MeasurementField;

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(MeasurementError::InvalidConfig(format!(
                "{name}: range [{}, {}] is empty or not finite",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Sanity limits for the pixel-to-millimeter conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleLimits {
    /// Below this detected span the division is numerically unstable.
    pub min_calibration_px: f64,
    pub min_mm_per_pixel: f64,
    pub max_mm_per_pixel: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min_calibration_px: 5.0,
            min_mm_per_pixel: 0.01,
            max_mm_per_pixel: 2.0,
        }
    }
}

/// Per-output ranges in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub pupillary_distance: Range,
    pub monocular_pd: Range,
    /// Applies to each component of an optical center offset.
    pub optical_center: Range,
    pub segment_height: Range,
    pub face_width: Range,
    pub face_height: Range,
    pub nose_bridge_width: Range,
    /// Allowed |PD - (monocular left + monocular right)|.
    pub max_pd_sum_deviation_mm: f64,
}

impl Bounds {
    /// Adult physiological limits. Values outside are rejected.
    pub const HARD: Bounds = Bounds {
        pupillary_distance: Range::new(45.0, 80.0),
        monocular_pd: Range::new(22.0, 40.0),
        optical_center: Range::new(-10.0, 10.0),
        segment_height: Range::new(8.0, 40.0),
        face_width: Range::new(100.0, 200.0),
        face_height: Range::new(120.0, 280.0),
        nose_bridge_width: Range::new(8.0, 30.0),
        max_pd_sum_deviation_mm: 0.5,
    };

    /// Typical adult ranges. Values outside only lower the quality score.
    pub const TYPICAL: Bounds = Bounds {
        pupillary_distance: Range::new(54.0, 74.0),
        monocular_pd: Range::new(26.0, 38.0),
        optical_center: Range::new(-5.0, 5.0),
        segment_height: Range::new(12.0, 30.0),
        face_width: Range::new(120.0, 170.0),
        face_height: Range::new(160.0, 250.0),
        nose_bridge_width: Range::new(12.0, 24.0),
        max_pd_sum_deviation_mm: 0.25,
    };

    pub fn range_for(&self, field: MeasurementField) -> Range {
        match field {
            MeasurementField::PupillaryDistance => self.pupillary_distance,
            MeasurementField::MonocularPdLeft | MeasurementField::MonocularPdRight => {
                self.monocular_pd
            }
            MeasurementField::OpticalCenterLeftX
            | MeasurementField::OpticalCenterLeftY
            | MeasurementField::OpticalCenterRightX
            | MeasurementField::OpticalCenterRightY => self.optical_center,
            MeasurementField::SegmentHeightLeft | MeasurementField::SegmentHeightRight => {
                self.segment_height
            }
            MeasurementField::FaceWidth => self.face_width,
            MeasurementField::FaceHeight => self.face_height,
            MeasurementField::NoseBridgeWidth => self.nose_bridge_width,
            MeasurementField::PdSumDeviation => Range::new(0.0, self.max_pd_sum_deviation_mm),
        }
    }

    fn validate(&self, tier: &str) -> Result<()> {
        self.pupillary_distance
            .validate(&format!("{tier}.pupillary_distance"))?;
        self.monocular_pd.validate(&format!("{tier}.monocular_pd"))?;
        self.optical_center
            .validate(&format!("{tier}.optical_center"))?;
        self.segment_height
            .validate(&format!("{tier}.segment_height"))?;
        self.face_width.validate(&format!("{tier}.face_width"))?;
        self.face_height.validate(&format!("{tier}.face_height"))?;
        self.nose_bridge_width
            .validate(&format!("{tier}.nose_bridge_width"))?;
        if !self.max_pd_sum_deviation_mm.is_finite() || self.max_pd_sum_deviation_mm < 0.0 {
            return Err(MeasurementError::InvalidConfig(format!(
                "{tier}.max_pd_sum_deviation_mm must be finite and non-negative"
            )));
        }
        Ok(())
    }
}

/// A bounds tier as read from JSON, where every range is optional.
#[derive(Debug, Default, Deserialize)]
struct BoundsOverride {
    pupillary_distance: Option<Range>,
    monocular_pd: Option<Range>,
    optical_center: Option<Range>,
    segment_height: Option<Range>,
    face_width: Option<Range>,
    face_height: Option<Range>,
    nose_bridge_width: Option<Range>,
    max_pd_sum_deviation_mm: Option<f64>,
}

impl BoundsOverride {
    fn apply(self, base: Bounds) -> Bounds {
        Bounds {
            pupillary_distance: self.pupillary_distance.unwrap_or(base.pupillary_distance),
            monocular_pd: self.monocular_pd.unwrap_or(base.monocular_pd),
            optical_center: self.optical_center.unwrap_or(base.optical_center),
            segment_height: self.segment_height.unwrap_or(base.segment_height),
            face_width: self.face_width.unwrap_or(base.face_width),
            face_height: self.face_height.unwrap_or(base.face_height),
            nose_bridge_width: self.nose_bridge_width.unwrap_or(base.nose_bridge_width),
            max_pd_sum_deviation_mm: self
                .max_pd_sum_deviation_mm
                .unwrap_or(base.max_pd_sum_deviation_mm),
        }
    }
}

fn hard_bounds<'de, D>(deserializer: D) -> std::result::Result<Bounds, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(BoundsOverride::deserialize(deserializer)?.apply(Bounds::HARD))
}

fn typical_bounds<'de, D>(deserializer: D) -> std::result::Result<Bounds, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(BoundsOverride::deserialize(deserializer)?.apply(Bounds::TYPICAL))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibilityBounds {
    #[serde(deserialize_with = "hard_bounds")]
    pub hard: Bounds,
    #[serde(deserialize_with = "typical_bounds")]
    pub typical: Bounds,
}

impl Default for PlausibilityBounds {
    fn default() -> Self {
        Self {
            hard: Bounds::HARD,
            typical: Bounds::TYPICAL,
        }
    }
}

/// Weights and penalties for the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub confidence_weight: f64,
    pub lighting_weight: f64,
    pub good_lighting_score: f64,
    pub fair_lighting_score: f64,
    pub poor_lighting_score: f64,
    /// Multiplier applied once per failed consistency/plausibility check.
    pub check_penalty: f64,
    /// Multiplier applied when the segment height was approximated.
    pub fallback_penalty: f64,
    /// Assumed standard deviation of each detected landmark, in pixels.
    pub landmark_noise_px: f64,
    pub max_pd_uncertainty_mm: f64,
    /// Segment height as a fraction of face height when no lower-frame landmark exists.
    pub segment_height_face_fraction: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            confidence_weight: 0.8,
            lighting_weight: 0.2,
            good_lighting_score: 1.0,
            fair_lighting_score: 0.7,
            poor_lighting_score: 0.3,
            check_penalty: 0.7,
            fallback_penalty: 0.85,
            landmark_noise_px: 1.0,
            max_pd_uncertainty_mm: 1.0,
            segment_height_face_fraction: 0.1,
        }
    }
}

impl QualityWeights {
    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(MeasurementError::InvalidConfig(msg.to_string()));

        if !(self.confidence_weight.is_finite() && self.lighting_weight.is_finite()) {
            return invalid("quality weights must be finite");
        }
        if !(self.confidence_weight > 0.0 && self.lighting_weight >= 0.0) {
            return invalid("quality weights must be positive");
        }
        if self.confidence_weight <= self.lighting_weight {
            return invalid("confidence_weight must exceed lighting_weight");
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(self.poor_lighting_score)
            && self.poor_lighting_score <= self.fair_lighting_score
            && self.fair_lighting_score <= self.good_lighting_score
            && in_unit(self.good_lighting_score))
        {
            return invalid("lighting scores must satisfy 0 <= poor <= fair <= good <= 1");
        }
        for (name, penalty) in [
            ("check_penalty", self.check_penalty),
            ("fallback_penalty", self.fallback_penalty),
        ] {
            if !(penalty > 0.0 && penalty <= 1.0) {
                return Err(MeasurementError::InvalidConfig(format!(
                    "{name} must lie in (0, 1]"
                )));
            }
        }
        if !(self.landmark_noise_px >= 0.0 && self.landmark_noise_px.is_finite()) {
            return invalid("landmark_noise_px must be finite and non-negative");
        }
        if !(self.max_pd_uncertainty_mm > 0.0) {
            return invalid("max_pd_uncertainty_mm must be positive");
        }
        if !(self.segment_height_face_fraction > 0.0 && self.segment_height_face_fraction < 1.0) {
            return invalid("segment_height_face_fraction must lie in (0, 1)");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scale: ScaleLimits,
    pub bounds: PlausibilityBounds,
    pub quality: QualityWeights,
}

impl EngineConfig {
    /// Load a (possibly partial) configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let scale = &self.scale;
        if !(scale.min_calibration_px > 0.0 && scale.min_calibration_px.is_finite()) {
            return Err(MeasurementError::InvalidConfig(
                "scale.min_calibration_px must be positive".to_string(),
            ));
        }
        Range::new(scale.min_mm_per_pixel, scale.max_mm_per_pixel).validate("scale.mm_per_pixel")?;
        if scale.min_mm_per_pixel <= 0.0 {
            return Err(MeasurementError::InvalidConfig(
                "scale.min_mm_per_pixel must be positive".to_string(),
            ));
        }

        self.bounds.hard.validate("bounds.hard")?;
        self.bounds.typical.validate("bounds.typical")?;
        self.quality.validate()
    }
}
