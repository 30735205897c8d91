//! Lighting classification.
//!
//! The engine consumes an upstream estimate as-is, clamped to three levels.
//! [`estimate_lighting`] is a simple luminance-statistics estimator for
//! callers without one of their own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum score classified as [`LightingCondition::Good`].
pub const GOOD_LIGHTING_THRESHOLD: f64 = 0.7;
/// Minimum score classified as [`LightingCondition::Fair`].
pub const FAIR_LIGHTING_THRESHOLD: f64 = 0.4;

/// Pixels at or below this intensity count as crushed shadows.
const SHADOW_CLIP: u8 = 5;
/// Pixels at or above this intensity count as blown highlights.
const HIGHLIGHT_CLIP: u8 = 250;
/// Standard deviation at which contrast stops limiting the score.
const FULL_CONTRAST_STDDEV: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingCondition {
    Good,
    Fair,
    Poor,
}

impl LightingCondition {
    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_LIGHTING_THRESHOLD {
            LightingCondition::Good
        } else if score >= FAIR_LIGHTING_THRESHOLD {
            LightingCondition::Fair
        } else {
            // NaN lands here too.
            LightingCondition::Poor
        }
    }
}

impl fmt::Display for LightingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LightingCondition::Good => "good",
            LightingCondition::Fair => "fair",
            LightingCondition::Poor => "poor",
        })
    }
}

/// Output of an upstream lighting estimator: either a label or a score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LightingEstimate {
    Label(LightingCondition),
    Score(f64),
}

impl LightingEstimate {
    pub fn condition(&self) -> LightingCondition {
        match *self {
            LightingEstimate::Label(condition) => condition,
            LightingEstimate::Score(score) => LightingCondition::from_score(score),
        }
    }
}

impl From<LightingCondition> for LightingEstimate {
    fn from(condition: LightingCondition) -> Self {
        LightingEstimate::Label(condition)
    }
}

/// Trait for accessing pixel intensities from an image.
pub trait ImageAccess {
    /// Get the grayscale intensity at (x, y). Returns 0 for out-of-bounds pixels.
    fn get_pixel(&self, x: u32, y: u32) -> u8;

    /// Image dimensions.
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A simple grayscale image buffer implementing ImageAccess.
pub struct GrayImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> u8,
    {
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }
}

impl ImageAccess for GrayImage {
    fn get_pixel(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Luminance summary of a grayscale image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceStats {
    pub mean: f64,
    pub stddev: f64,
    /// Fraction of pixels crushed to black or blown to white.
    pub clipped_fraction: f64,
}

impl LuminanceStats {
    pub fn from_image<I: ImageAccess>(image: &I) -> Option<Self> {
        let count = u64::from(image.width()) * u64::from(image.height());
        if count == 0 {
            return None;
        }

        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut clipped = 0u64;
        for y in 0..image.height() {
            for x in 0..image.width() {
                let v = image.get_pixel(x, y);
                let f = f64::from(v);
                sum += f;
                sum_sq += f * f;
                if v <= SHADOW_CLIP || v >= HIGHLIGHT_CLIP {
                    clipped += 1;
                }
            }
        }

        let n = count as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);
        Some(Self {
            mean,
            stddev: variance.sqrt(),
            clipped_fraction: clipped as f64 / n,
        })
    }

    /// Score in [0, 1]: exposure near mid-gray, enough contrast, little clipping.
    pub fn score(&self) -> f64 {
        let exposure = 1.0 - (self.mean - 127.5).abs() / 127.5;
        let contrast = (self.stddev / FULL_CONTRAST_STDDEV).min(1.0);
        (exposure * contrast * (1.0 - self.clipped_fraction)).clamp(0.0, 1.0)
    }
}

/// Estimate lighting from luminance statistics. An empty image scores zero.
pub fn estimate_lighting<I: ImageAccess>(image: &I) -> LightingEstimate {
    let score = LuminanceStats::from_image(image).map_or(0.0, |stats| stats.score());
    LightingEstimate::Score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_thresholds() {
        assert_eq!(LightingCondition::from_score(0.95), LightingCondition::Good);
        assert_eq!(LightingCondition::from_score(0.7), LightingCondition::Good);
        assert_eq!(LightingCondition::from_score(0.5), LightingCondition::Fair);
        assert_eq!(LightingCondition::from_score(0.1), LightingCondition::Poor);
        assert_eq!(LightingCondition::from_score(f64::NAN), LightingCondition::Poor);
        // Out-of-range scores clamp to the nearest level.
        assert_eq!(LightingCondition::from_score(7.0), LightingCondition::Good);
        assert_eq!(LightingCondition::from_score(-3.0), LightingCondition::Poor);
    }

    #[test]
    fn estimate_deserializes_label_or_score() {
        let label: LightingEstimate = serde_json::from_str(r#""fair""#).unwrap();
        assert_eq!(label, LightingEstimate::Label(LightingCondition::Fair));
        let score: LightingEstimate = serde_json::from_str("0.82").unwrap();
        assert_eq!(score.condition(), LightingCondition::Good);
    }

    #[test]
    fn gradient_image_is_well_lit() {
        let image = GrayImage::from_fn(256, 256, |x, y| ((x + y) % 256) as u8);
        let stats = LuminanceStats::from_image(&image).unwrap();
        assert!((stats.mean - 127.5).abs() < 1.0);
        assert!(stats.clipped_fraction < 0.05);
        assert_eq!(estimate_lighting(&image).condition(), LightingCondition::Good);
    }

    #[test]
    fn dark_image_is_poor() {
        let image = GrayImage::from_fn(64, 64, |x, _| (x % 8) as u8);
        assert_eq!(estimate_lighting(&image).condition(), LightingCondition::Poor);
    }

    #[test]
    fn flat_gray_image_lacks_contrast() {
        let image = GrayImage::from_fn(64, 64, |_, _| 128);
        let stats = LuminanceStats::from_image(&image).unwrap();
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(estimate_lighting(&image).condition(), LightingCondition::Poor);
    }

    #[test]
    fn empty_image_scores_zero() {
        let image = GrayImage::new(Vec::new(), 0, 0);
        assert_eq!(estimate_lighting(&image), LightingEstimate::Score(0.0));
    }

    #[test]
    fn out_of_bounds_pixel_is_black() {
        let image = GrayImage::from_fn(2, 2, |_, _| 200);
        assert_eq!(image.get_pixel(5, 0), 0);
        assert_eq!(image.get_pixel(1, 1), 200);
    }
}
