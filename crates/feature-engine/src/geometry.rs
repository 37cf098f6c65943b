//! Frame-local landmark geometry

use crate::ExtractError;
use face_signals::landmarks::indices;
use face_signals::{FaceLandmarks, LandmarkGroup, Point};

/// Brow-to-eye distance (as a fraction of face height) at which lowering starts
const BROW_NEUTRAL_RATIO: f32 = 0.1;
/// Gain applied to the brow ratio shortfall
const BROW_GAIN: f32 = 10.0;

/// Fetch a required landmark
pub fn require(
    landmarks: &FaceLandmarks,
    group: LandmarkGroup,
    index: usize,
) -> Result<Point, ExtractError> {
    landmarks
        .point(group, index)
        .ok_or_else(|| ExtractError::MissingLandmarks {
            group,
            index,
            len: landmarks.group(group).len(),
        })
}

/// `numerator / denominator`, or 0 when the denominator is degenerate
pub fn safe_ratio(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Eye aspect ratio over six contour points p1..p6 (clockwise from the
/// outer corner): `(|p2-p6| + |p3-p5|) / (2 |p1-p4|)`, lid gaps measured
/// vertically and the corner span horizontally. A zero-width eye yields 0.
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> f32 {
    let p2_p6 = (eye[1].y - eye[5].y).abs();
    let p3_p5 = (eye[2].y - eye[4].y).abs();
    let p1_p4 = (eye[0].x - eye[3].x).abs();
    safe_ratio(p2_p6 + p3_p5, 2.0 * p1_p4)
}

fn eye_points(landmarks: &FaceLandmarks, group: LandmarkGroup) -> Result<[Point; 6], ExtractError> {
    let points = landmarks.group(group);
    points
        .get(..6)
        .and_then(|p| <[Point; 6]>::try_from(p).ok())
        .ok_or(ExtractError::MissingLandmarks {
            group,
            index: 5,
            len: points.len(),
        })
}

/// Mean EAR of both eyes
pub fn average_ear(landmarks: &FaceLandmarks) -> Result<f32, ExtractError> {
    let left = eye_aspect_ratio(&eye_points(landmarks, LandmarkGroup::LeftEye)?);
    let right = eye_aspect_ratio(&eye_points(landmarks, LandmarkGroup::RightEye)?);
    Ok((left + right) / 2.0)
}

/// Chin tip to nose bridge vertical distance (pixels)
pub fn face_height(landmarks: &FaceLandmarks) -> Result<f32, ExtractError> {
    let chin = require(landmarks, LandmarkGroup::Jaw, indices::CHIN_TIP)?;
    let bridge = require(landmarks, LandmarkGroup::Nose, indices::NOSE_BRIDGE)?;
    Ok((chin.y - bridge.y).abs())
}

/// Inner-lip gap over face height. Falls back to the outer lip centres when
/// the inner contour is absent; 0 when neither is available.
pub fn mouth_openness(landmarks: &FaceLandmarks, face_height: f32) -> f32 {
    let upper = landmarks
        .point(LandmarkGroup::Mouth, indices::MOUTH_INNER_UPPER)
        .or_else(|| landmarks.point(LandmarkGroup::Mouth, indices::MOUTH_OUTER_UPPER));
    let lower = landmarks
        .point(LandmarkGroup::Mouth, indices::MOUTH_INNER_LOWER)
        .or_else(|| landmarks.point(LandmarkGroup::Mouth, indices::MOUTH_OUTER_LOWER));

    match (upper, lower) {
        (Some(upper), Some(lower)) => safe_ratio((lower.y - upper.y).abs(), face_height),
        _ => 0.0,
    }
}

/// Brow lowering in [0, 1]; a brow sitting closer to the eye gives a larger value
pub fn brow_lowering(landmarks: &FaceLandmarks, face_height: f32) -> Result<f32, ExtractError> {
    let brow = require(landmarks, LandmarkGroup::LeftEyebrow, indices::BROW_ARCH)?;
    let lid = require(landmarks, LandmarkGroup::LeftEye, indices::EYE_UPPER_LID)?;

    if face_height == 0.0 || !face_height.is_finite() {
        return Ok(0.0);
    }
    let ratio = (lid.y - brow.y).abs() / face_height;
    Ok(((BROW_NEUTRAL_RATIO - ratio) * BROW_GAIN).clamp(0.0, 1.0))
}

/// Bottom-lip centre minus mean corner height, over the bounding-box height.
/// Heuristic proxy; downstream thresholds are tuned against this exact form.
pub fn smile_curvature(landmarks: &FaceLandmarks, box_height: f32) -> Result<f32, ExtractError> {
    let left = require(landmarks, LandmarkGroup::Mouth, indices::MOUTH_LEFT_CORNER)?;
    let right = require(landmarks, LandmarkGroup::Mouth, indices::MOUTH_RIGHT_CORNER)?;
    let bottom = require(landmarks, LandmarkGroup::Mouth, indices::MOUTH_OUTER_LOWER)?;

    let avg_corner_y = (left.y + right.y) / 2.0;
    Ok(safe_ratio(bottom.y - avg_corner_y, box_height))
}
