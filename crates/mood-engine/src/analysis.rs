//! Per-tick detection results

use face_signals::Expressions;
use feature_engine::MoodHeuristics;
use mood_classifier::Mood;
use serde::{Deserialize, Serialize};

/// What happened on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickStatus {
    /// A face was found and fully analyzed
    Detected,
    /// No face in the frame
    NoFace,
    /// Detector or geometry fault; nothing should be updated
    #[default]
    Skipped,
}

/// Diagnostic values behind a result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugBundle {
    pub expressions: Expressions,
    pub heuristics: MoodHeuristics,
}

/// Complete detection result for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub status: TickStatus,

    /// Classified mood; `None` means the caller keeps its previous mood
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,

    /// Nose dropped below the calibrated baseline
    pub slouch_detected: bool,

    /// Subject not facing the camera
    pub distracted: bool,

    /// Detector confidence score (0 without a face)
    pub confidence: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugBundle>,
}

impl DetectionResult {
    /// Result for a frame without a face
    pub fn no_face(gaze_away_ratio: f32) -> Self {
        Self {
            status: TickStatus::NoFace,
            mood: None,
            slouch_detected: false,
            distracted: true,
            confidence: 0.0,
            debug: Some(DebugBundle {
                expressions: Expressions::default(),
                heuristics: MoodHeuristics::no_face(gaze_away_ratio),
            }),
        }
    }

    /// Empty update for a tick that could not be processed
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_detected(&self) -> bool {
        self.status == TickStatus::Detected
    }

    pub fn is_skipped(&self) -> bool {
        self.status == TickStatus::Skipped
    }

    /// Heuristics behind the result, if any were computed
    pub fn heuristics(&self) -> Option<&MoodHeuristics> {
        self.debug.as_ref().map(|d| &d.heuristics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_is_empty() {
        let result = DetectionResult::skipped();
        assert!(result.is_skipped());
        assert!(result.mood.is_none());
        assert!(!result.distracted);
        assert!(result.debug.is_none());
    }

    #[test]
    fn test_no_face_keeps_gaze_ratio() {
        let result = DetectionResult::no_face(0.4);
        assert!(result.distracted);
        assert!(result.mood.is_none());
        let heuristics = result.heuristics().unwrap();
        assert_eq!(heuristics.gaze_away_ratio, 0.4);
        assert_eq!(heuristics.blink_rate, 0.0);
        assert_eq!(heuristics.eye_openness, 0.0);
    }

    #[test]
    fn test_serialization_omits_missing_mood() {
        let json = serde_json::to_value(DetectionResult::no_face(1.0)).unwrap();
        assert_eq!(json["status"], "no_face");
        assert!(json.get("mood").is_none());
        assert_eq!(json["distracted"], true);
    }
}
