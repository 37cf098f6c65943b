//! Mood heuristics assembly

use crate::geometry;
use crate::ExtractError;
use face_signals::landmarks::indices;
use face_signals::{LandmarkGroup, RawFrameObservation};
use serde::{Deserialize, Serialize};

/// Heuristic extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// EAR below which the eyes count as closed
    pub blink_ear_threshold: f32,

    /// Trailing window for blink-rate computation (milliseconds)
    pub blink_window_ms: u64,

    /// Number of gaze samples kept
    pub gaze_capacity: usize,

    /// Detector score below which a found face still counts as looking away.
    /// `None` disables the check (a found face is always "looking").
    pub away_confidence_threshold: Option<f32>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            blink_ear_threshold: 0.25,
            blink_window_ms: 30_000,
            gaze_capacity: 30,
            away_confidence_threshold: None,
        }
    }
}

impl HeuristicsConfig {
    /// Whether a found face with this detector score is looking away
    pub fn is_looking_away(&self, score: f32) -> bool {
        self.away_confidence_threshold
            .map_or(false, |threshold| score < threshold)
    }
}

/// Smoothed, bounded signals the mood classifier consumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodHeuristics {
    /// Corner height vs. bottom lip, over box height
    pub smile_curvature: f32,
    /// Inner-lip gap over face height
    pub mouth_openness: f32,
    /// Blinks per minute over the trailing window
    pub blink_rate: f32,
    /// Fraction of recent ticks looking away, in [0, 1]
    pub gaze_away_ratio: f32,
    /// Brow furrowing, in [0, 1]
    pub brow_lowering: f32,
    /// Raw averaged EAR of the current frame
    pub eye_openness: f32,
}

impl MoodHeuristics {
    /// Heuristics for a tick without a face: everything zero except the gaze ratio
    pub fn no_face(gaze_away_ratio: f32) -> Self {
        Self {
            gaze_away_ratio,
            ..Default::default()
        }
    }
}

/// Everything measurable from a single frame, before rolling state is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    /// Averaged eye aspect ratio
    pub ear: f32,
    pub mouth_openness: f32,
    pub brow_lowering: f32,
    pub smile_curvature: f32,
    /// Nose tip height, normalized by frame height
    pub nose_y: f32,
    /// Bounding-box height, normalized by frame height
    pub face_height: f32,
}

impl FrameGeometry {
    /// Measure one observation. Fails without side effects on malformed input.
    pub fn measure(observation: &RawFrameObservation) -> Result<Self, ExtractError> {
        if observation.frame_height <= 0.0 || !observation.frame_height.is_finite() {
            return Err(ExtractError::InvalidFrame(format!(
                "frame height {} cannot normalize positions",
                observation.frame_height
            )));
        }

        let landmarks = &observation.landmarks;
        let ear = geometry::average_ear(landmarks)?;
        let face_height_px = geometry::face_height(landmarks)?;
        let mouth_openness = geometry::mouth_openness(landmarks, face_height_px);
        let brow_lowering = geometry::brow_lowering(landmarks, face_height_px)?;
        let smile_curvature = geometry::smile_curvature(landmarks, observation.box_height)?;
        let nose_tip = geometry::require(landmarks, LandmarkGroup::Nose, indices::NOSE_TIP)?;

        let geometry = Self {
            ear,
            mouth_openness,
            brow_lowering,
            smile_curvature,
            nose_y: nose_tip.y / observation.frame_height,
            face_height: observation.box_height / observation.frame_height,
        };
        if !geometry.is_finite() {
            return Err(ExtractError::InvalidFrame(
                "landmark geometry is not finite".to_string(),
            ));
        }
        Ok(geometry)
    }

    fn is_finite(&self) -> bool {
        [
            self.ear,
            self.mouth_openness,
            self.brow_lowering,
            self.smile_curvature,
            self.nose_y,
            self.face_height,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Combine with the rolling blink rate and gaze ratio
    pub fn heuristics(&self, blink_rate: f32, gaze_away_ratio: f32) -> MoodHeuristics {
        MoodHeuristics {
            smile_curvature: self.smile_curvature,
            mouth_openness: self.mouth_openness,
            blink_rate,
            gaze_away_ratio,
            brow_lowering: self.brow_lowering,
            eye_openness: self.ear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_signals::{FaceLandmarks, Point};

    fn observation() -> RawFrameObservation {
        let mut points = vec![Point::new(0.0, 0.0); 68];
        // Eyes: 10px wide, 3px open on both lid pairs
        for base in [36, 42] {
            points[base] = Point::new(0.0, 200.0);
            points[base + 1] = Point::new(3.0, 198.5);
            points[base + 2] = Point::new(7.0, 198.5);
            points[base + 3] = Point::new(10.0, 200.0);
            points[base + 4] = Point::new(7.0, 201.5);
            points[base + 5] = Point::new(3.0, 201.5);
        }
        points[19] = Point::new(3.0, 190.0); // left brow arch
        points[27] = Point::new(0.0, 200.0); // nose bridge
        points[30] = Point::new(0.0, 240.0); // nose tip
        points[8] = Point::new(0.0, 300.0); // chin
        points[48] = Point::new(-20.0, 260.0); // mouth corners
        points[54] = Point::new(20.0, 260.0);
        points[57] = Point::new(0.0, 270.0); // bottom lip
        points[62] = Point::new(0.0, 262.0); // inner upper
        points[66] = Point::new(0.0, 266.0); // inner lower

        RawFrameObservation {
            score: 0.9,
            box_height: 160.0,
            frame_height: 480.0,
            landmarks: FaceLandmarks::from_points(&points).unwrap(),
            expressions: Default::default(),
        }
    }

    #[test]
    fn test_measure() {
        let geometry = FrameGeometry::measure(&observation()).unwrap();

        assert!((geometry.ear - 0.3).abs() < 1e-5);
        // face height 100px: inner lips 4px apart
        assert!((geometry.mouth_openness - 0.04).abs() < 1e-5);
        // brow 8.5px above the lid: ratio 0.085 -> 0.15
        assert!((geometry.brow_lowering - 0.15).abs() < 1e-4);
        // (270 - 260) / 160
        assert!((geometry.smile_curvature - 0.0625).abs() < 1e-6);
        assert!((geometry.nose_y - 0.5).abs() < 1e-6);
        assert!((geometry.face_height - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_measure_rejects_bad_frame_height() {
        let mut obs = observation();
        obs.frame_height = 0.0;
        assert!(matches!(
            FrameGeometry::measure(&obs),
            Err(ExtractError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_measure_rejects_missing_groups() {
        let mut obs = observation();
        obs.landmarks.nose.truncate(2);
        assert!(matches!(
            FrameGeometry::measure(&obs),
            Err(ExtractError::MissingLandmarks {
                group: LandmarkGroup::Nose,
                ..
            })
        ));
    }

    #[test]
    fn test_measure_rejects_nan_landmarks() {
        let mut obs = observation();
        obs.landmarks.nose[3].y = f32::NAN;
        assert!(matches!(
            FrameGeometry::measure(&obs),
            Err(ExtractError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_away_confidence_threshold() {
        let config = HeuristicsConfig::default();
        assert!(!config.is_looking_away(0.1));

        let config = HeuristicsConfig {
            away_confidence_threshold: Some(0.85),
            ..Default::default()
        };
        assert!(config.is_looking_away(0.8));
        assert!(!config.is_looking_away(0.9));
    }
}
