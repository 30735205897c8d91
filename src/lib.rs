//! # facial-optics
//!
//! Optical measurements for eyewear from a single photograph.
//!
//! Given facial landmarks detected in a photo that also shows a reference
//! object of known size (a bank card, a coin, a ruler), this crate computes:
//! - **Pupillary distance**: binocular and monocular (left/right)
//! - **Optical center offsets**: pupil displacement from each eye's corner midpoint
//! - **Segment heights**: pupil to lower frame reference, for bifocals and progressives
//! - **Face metrics**: face width/height and nose-bridge width
//! - **Quality**: a score in [0, 1] combining detection confidence, lighting,
//!   consistency and plausibility checks, and propagated landmark noise
//!
//! Detection itself is out of scope: landmarks come from an external detector.
//!
//! ## Pipeline
//!
//! 1. Validate landmarks against the image bounds
//! 2. Resolve mm/pixel from the calibration object's detected span
//! 3. Compute every distance in millimeters
//! 4. Score quality and flag failed checks
//! 5. Reject any value outside hard physiological bounds
//!
//! ## Quick Start
//!
//! ```rust
//! use facial_optics::{
//!     compute_measurement, CalibrationKind, CalibrationObject, LandmarkSet,
//!     LightingCondition, Point,
//! };
//!
//! let landmarks = LandmarkSet {
//!     image_width: 1000,
//!     image_height: 1000,
//!     left_pupil: Some(Point::new(430.0, 400.0)),
//!     right_pupil: Some(Point::new(570.0, 400.0)),
//!     left_eye_outer_corner: Some(Point::new(390.0, 402.0)),
//!     left_eye_inner_corner: Some(Point::new(466.0, 402.0)),
//!     right_eye_inner_corner: Some(Point::new(534.0, 402.0)),
//!     right_eye_outer_corner: Some(Point::new(610.0, 402.0)),
//!     nose_bridge_left: Some(Point::new(482.0, 420.0)),
//!     nose_bridge_right: Some(Point::new(518.0, 420.0)),
//!     face_top_left: Some(Point::new(330.0, 180.0)),
//!     face_bottom_right: Some(Point::new(670.0, 640.0)),
//!     calibration_start: Some(Point::new(100.0, 900.0)),
//!     calibration_end: Some(Point::new(300.0, 900.0)),
//!     lower_frame_left: Some(Point::new(430.0, 450.0)),
//!     lower_frame_right: Some(Point::new(570.0, 450.0)),
//! };
//!
//! let card = CalibrationObject::standard(CalibrationKind::CreditCard);
//! let result = compute_measurement(&landmarks, &card, 0.95, LightingCondition::Good.into())
//!     .unwrap();
//!
//! // 85.60mm over 200px, pupils 140px apart
//! assert!((result.pupillary_distance_mm - 59.92).abs() < 1e-9);
//! println!("PD: {:.1} mm", result.rounded().pupillary_distance_mm);
//! ```
//!
//! ## Lighting
//!
//! Pass an upstream [`LightingEstimate`], or compute one from a grayscale
//! image through the [`ImageAccess`] trait:
//!
//! ```rust
//! use facial_optics::{estimate_lighting, GrayImage, LightingCondition};
//!
//! let image = GrayImage::from_fn(256, 256, |x, y| ((x + y) % 256) as u8);
//! assert_eq!(estimate_lighting(&image).condition(), LightingCondition::Good);
//! ```

mod calibration;
mod config;
mod engine;
mod error;
mod geometry;
mod landmarks;
mod lighting;
mod quality;
mod result;
mod scale;
mod types;

pub use calibration::{
    real_size_mm_for, real_size_mm_for_name, CalibrationKind, CalibrationObject,
    COIN_DIAMETER_MM, ID1_CARD_LENGTH_MM, RULER_SEGMENT_MM,
};
pub use config::{Bounds, EngineConfig, PlausibilityBounds, QualityWeights, Range, ScaleLimits};
pub use engine::{compute_measurement, MeasurementEngine};
pub use error::{MeasurementError, Result};
pub use geometry::{FacialGeometry, OpticalCenterOffset, SegmentHeight};
pub use landmarks::{Landmark, LandmarkSet};
pub use lighting::{
    estimate_lighting, GrayImage, ImageAccess, LightingCondition, LightingEstimate,
    LuminanceStats,
};
pub use quality::{assess, pd_uncertainty_mm, quality_score, QualityFlag, QualityInputs, QualityReport};
pub use result::{MeasurementField, MeasurementResult};
pub use scale::{resolve_scale, ScaleFactor};
pub use types::{BoundingBox, Point};
