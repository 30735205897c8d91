//! End-to-end measurement scenarios through the public API.

mod common;

use approx::assert_relative_eq;
use common::{frontal_landmarks, scaled};
use facial_optics::{
    compute_measurement, CalibrationKind, CalibrationObject, EngineConfig, Landmark,
    LightingCondition, LightingEstimate, MeasurementEngine, MeasurementError, MeasurementField,
    Point, QualityFlag,
};
use std::path::PathBuf;

fn card() -> CalibrationObject {
    CalibrationObject::standard(CalibrationKind::CreditCard)
}

fn good() -> LightingEstimate {
    LightingEstimate::Label(LightingCondition::Good)
}

#[test]
fn card_over_200px_and_pupils_140px_apart() {
    let result = compute_measurement(&frontal_landmarks(), &card(), 0.95, good()).unwrap();

    // 85.60 / 200 * 140
    assert_relative_eq!(result.pupillary_distance_mm, 59.92, epsilon = 1e-9);
    assert_relative_eq!(
        result.pupillary_distance_mm,
        result.monocular_pd_left_mm + result.monocular_pd_right_mm,
        epsilon = 0.5
    );
    assert_relative_eq!(result.face_width_mm, 145.52, epsilon = 1e-9);
    assert_relative_eq!(result.face_height_mm, 196.88, epsilon = 1e-9);
    assert_relative_eq!(result.nose_bridge_width_mm, 15.408, epsilon = 1e-9);
    assert_relative_eq!(result.segment_height_left.mm(), 21.4, epsilon = 1e-9);
    assert!(!result.segment_height_estimated());
}

#[test]
fn calibration_spanning_3px_is_degenerate() {
    let mut set = frontal_landmarks();
    set.calibration_start = Some(Point::new(100.0, 900.0));
    set.calibration_end = Some(Point::new(103.0, 900.0));

    let err = compute_measurement(&set, &card(), 0.95, good()).unwrap_err();
    match err {
        MeasurementError::DegenerateCalibration {
            pixel_distance,
            min_pixels,
        } => {
            assert_relative_eq!(pixel_distance, 3.0);
            assert_relative_eq!(min_pixels, 5.0);
        }
        other => panic!("expected DegenerateCalibration, got {other:?}"),
    }
}

#[test]
fn missing_right_pupil_is_insufficient() {
    let mut set = frontal_landmarks();
    set.right_pupil = None;

    let err = compute_measurement(&set, &card(), 0.95, good()).unwrap_err();
    assert!(matches!(
        err,
        MeasurementError::InsufficientLandmarks {
            missing: Landmark::RightPupil
        }
    ));
}

#[test]
fn clean_inputs_score_high_and_fallback_scores_lower() {
    let clean = compute_measurement(&frontal_landmarks(), &card(), 0.95, good()).unwrap();
    assert!(clean.measurement_quality >= 0.9);
    assert!(clean.quality_flags.is_empty());

    let mut set = frontal_landmarks();
    set.lower_frame_left = None;
    set.lower_frame_right = None;
    let fallback = compute_measurement(&set, &card(), 0.95, good()).unwrap();

    assert!(fallback.segment_height_estimated());
    assert!(fallback.quality_flags.contains(&QualityFlag::SegmentHeightEstimated));
    assert!(fallback.measurement_quality < clean.measurement_quality);
    // Fallback is 10% of face height.
    assert_relative_eq!(fallback.segment_height_left.mm(), 19.688, epsilon = 1e-9);
}

#[test]
fn fair_lighting_scores_below_good() {
    // Quality 0.8 * 0.95 + 0.2 * 0.7, right on the 0.9 line that Good clears easily.
    let fair = LightingEstimate::Label(LightingCondition::Fair);
    let dim = compute_measurement(&frontal_landmarks(), &card(), 0.95, fair).unwrap();
    let lit = compute_measurement(&frontal_landmarks(), &card(), 0.95, good()).unwrap();

    assert!(dim.quality_flags.is_empty());
    assert_relative_eq!(dim.measurement_quality, 0.90, epsilon = 1e-9);
    assert_relative_eq!(lit.measurement_quality, 0.96, epsilon = 1e-9);
    assert!(dim.measurement_quality < lit.measurement_quality);
}

#[test]
fn low_resolution_photo_flags_high_uncertainty() {
    // Calibration over 60px and pupils 42px apart: about 1.43 mm/px.
    let small = scaled(&frontal_landmarks(), 0.3);
    let result = compute_measurement(&small, &card(), 0.95, good()).unwrap();

    assert_relative_eq!(result.pupillary_distance_mm, 59.92, epsilon = 1e-6);
    assert!(result.pd_uncertainty_mm > 1.0);
    assert_eq!(result.quality_flags, vec![QualityFlag::HighUncertainty]);
    assert_relative_eq!(result.measurement_quality, 0.96 * 0.7, epsilon = 1e-9);
}

#[test]
fn wide_face_is_flagged_atypical_but_accepted() {
    // 420px wide: 179.76mm, above the typical 170mm but under the hard 200mm.
    let mut set = frontal_landmarks();
    set.face_bottom_right = Some(Point::new(750.0, 640.0));
    let result = compute_measurement(&set, &card(), 0.95, good()).unwrap();

    assert_relative_eq!(result.face_width_mm, 179.76, epsilon = 1e-9);
    assert_eq!(
        result.quality_flags,
        vec![QualityFlag::AtypicalValue(MeasurementField::FaceWidth)]
    );
    assert_relative_eq!(result.measurement_quality, 0.96 * 0.7, epsilon = 1e-9);
}

#[test]
fn lower_frame_above_pupil_is_implausible() {
    let mut set = frontal_landmarks();
    set.lower_frame_left = Some(Point::new(430.0, 350.0));

    let err = compute_measurement(&set, &card(), 0.95, good()).unwrap_err();
    match err {
        MeasurementError::ImplausibleResult { field, value, .. } => {
            assert_eq!(field, MeasurementField::SegmentHeightLeft);
            assert_relative_eq!(value, -21.4, epsilon = 1e-9);
        }
        other => panic!("expected ImplausibleResult, got {other:?}"),
    }
}

#[test]
fn partial_hard_bounds_in_config_file() {
    let path = std::env::temp_dir().join(format!("facial-optics-bounds-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "bounds": { "hard": { "pupillary_distance": { "min": 45.0, "max": 58.0 } } } }"#,
    )
    .unwrap();
    let config = EngineConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let engine = MeasurementEngine::new(config).unwrap();
    let err = engine
        .compute(&frontal_landmarks(), &card(), 0.95, good())
        .unwrap_err();
    assert!(matches!(
        err,
        MeasurementError::ImplausibleResult {
            field: MeasurementField::PupillaryDistance,
            ..
        }
    ));
}

#[test]
fn scale_is_photograph_specific() {
    let near = compute_measurement(&frontal_landmarks(), &card(), 0.9, good()).unwrap();
    let far = compute_measurement(&scaled(&frontal_landmarks(), 1.5), &card(), 0.9, good())
        .unwrap();

    assert_relative_eq!(far.mm_per_pixel, near.mm_per_pixel / 1.5, epsilon = 1e-12);
    assert_relative_eq!(far.pupillary_distance_mm, near.pupillary_distance_mm, epsilon = 1e-9);
    assert_relative_eq!(far.face_width_mm, near.face_width_mm, epsilon = 1e-9);
    // More pixels across the same features: less propagated noise.
    assert!(far.pd_uncertainty_mm < near.pd_uncertainty_mm);
}

#[test]
fn out_of_bounds_landmark_is_rejected() {
    let mut set = frontal_landmarks();
    set.face_bottom_right = Some(Point::new(670.0, 1200.0));

    let err = compute_measurement(&set, &card(), 0.9, good()).unwrap_err();
    assert!(matches!(
        err,
        MeasurementError::LandmarkOutOfBounds {
            landmark: Landmark::FaceBottomRight,
            height: 1000,
            ..
        }
    ));
}

#[test]
fn wrong_calibration_kind_gives_implausible_result() {
    // The card is in the photo but the caller claims a ruler: every value
    // comes out 100/85.6 too large and PD leaves the adult range.
    let ruler = CalibrationObject::standard(CalibrationKind::Ruler);
    let mut set = frontal_landmarks();
    set.left_pupil = Some(Point::new(415.0, 400.0));
    set.right_pupil = Some(Point::new(585.0, 400.0));
    set.left_eye_outer_corner = Some(Point::new(375.0, 402.0));
    set.left_eye_inner_corner = Some(Point::new(451.0, 402.0));
    set.right_eye_inner_corner = Some(Point::new(549.0, 402.0));
    set.right_eye_outer_corner = Some(Point::new(625.0, 402.0));

    let err = compute_measurement(&set, &ruler, 0.9, good()).unwrap_err();
    match err {
        MeasurementError::ImplausibleResult { field, value, max, .. } => {
            assert_eq!(field, MeasurementField::PupillaryDistance);
            // 100mm / 200px * 170px
            assert_relative_eq!(value, 85.0, epsilon = 1e-9);
            assert!(value > max);
        }
        other => panic!("expected ImplausibleResult, got {other:?}"),
    }
}

#[test]
fn unknown_calibration_name_is_reported() {
    let err = "passport".parse::<CalibrationKind>().unwrap_err();
    assert!(matches!(err, MeasurementError::UnknownCalibrationKind(_)));
}

#[test]
fn lighting_score_is_clamped_to_label() {
    let poor = compute_measurement(
        &frontal_landmarks(),
        &card(),
        0.95,
        LightingEstimate::Score(0.2),
    )
    .unwrap();
    assert_eq!(poor.lighting_condition, LightingCondition::Poor);

    let well_lit = compute_measurement(&frontal_landmarks(), &card(), 0.95, good()).unwrap();
    assert!(poor.measurement_quality < well_lit.measurement_quality);
}

#[test]
fn result_round_trips_through_json() {
    let result = compute_measurement(&frontal_landmarks(), &card(), 0.95, good()).unwrap();
    let json = serde_json::to_string(&result.rounded()).unwrap();
    assert!(json.contains("\"pupillary_distance_mm\":59.9"));
    assert!(json.contains("\"lighting_condition\":\"good\""));
    assert!(json.contains("\"source\":\"measured\""));
}

#[test]
fn config_file_overrides_defaults() {
    let path = std::env::temp_dir().join(format!("facial-optics-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "quality": { "fallback_penalty": 0.5 }, "scale": { "min_calibration_px": 250.0 } }"#,
    )
    .unwrap();
    let config = EngineConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let engine = MeasurementEngine::new(config).unwrap();
    // 200px calibration is now below the minimum span.
    let err = engine
        .compute(&frontal_landmarks(), &card(), 0.95, good())
        .unwrap_err();
    assert!(matches!(err, MeasurementError::DegenerateCalibration { .. }));
}

#[test]
fn missing_config_file_is_io_error() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("no-such-config.json");
    assert!(matches!(
        EngineConfig::from_json_file(path),
        Err(MeasurementError::Io(_))
    ));
}
