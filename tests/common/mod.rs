#![allow(dead_code)]

//! Shared detector-output fixtures.

use facial_optics::{LandmarkSet, Point};

/// 1000x1000 photo: credit card spanning 200px (0.428 mm/px), pupils 140px
/// apart on a level line, lower-frame points 50px below each pupil.
pub fn frontal_landmarks() -> LandmarkSet {
    LandmarkSet {
        image_width: 1000,
        image_height: 1000,
        left_pupil: Some(Point::new(430.0, 400.0)),
        right_pupil: Some(Point::new(570.0, 400.0)),
        left_eye_outer_corner: Some(Point::new(390.0, 402.0)),
        left_eye_inner_corner: Some(Point::new(466.0, 402.0)),
        right_eye_inner_corner: Some(Point::new(534.0, 402.0)),
        right_eye_outer_corner: Some(Point::new(610.0, 402.0)),
        nose_bridge_left: Some(Point::new(482.0, 420.0)),
        nose_bridge_right: Some(Point::new(518.0, 420.0)),
        face_top_left: Some(Point::new(330.0, 180.0)),
        face_bottom_right: Some(Point::new(670.0, 640.0)),
        calibration_start: Some(Point::new(100.0, 900.0)),
        calibration_end: Some(Point::new(300.0, 900.0)),
        lower_frame_left: Some(Point::new(430.0, 450.0)),
        lower_frame_right: Some(Point::new(570.0, 450.0)),
    }
}

/// The same photo scaled uniformly about the origin, so every output in
/// millimeters stays the same.
pub fn scaled(set: &LandmarkSet, factor: f64) -> LandmarkSet {
    let s = |p: Option<Point>| p.map(|p| p * factor);
    LandmarkSet {
        image_width: (f64::from(set.image_width) * factor).ceil() as u32,
        image_height: (f64::from(set.image_height) * factor).ceil() as u32,
        left_pupil: s(set.left_pupil),
        right_pupil: s(set.right_pupil),
        left_eye_inner_corner: s(set.left_eye_inner_corner),
        left_eye_outer_corner: s(set.left_eye_outer_corner),
        right_eye_inner_corner: s(set.right_eye_inner_corner),
        right_eye_outer_corner: s(set.right_eye_outer_corner),
        nose_bridge_left: s(set.nose_bridge_left),
        nose_bridge_right: s(set.nose_bridge_right),
        face_top_left: s(set.face_top_left),
        face_bottom_right: s(set.face_bottom_right),
        calibration_start: s(set.calibration_start),
        calibration_end: s(set.calibration_end),
        lower_frame_left: s(set.lower_frame_left),
        lower_frame_right: s(set.lower_frame_right),
    }
}
