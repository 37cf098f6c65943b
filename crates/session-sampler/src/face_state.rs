//! Caller-facing detection state

use face_signals::Expressions;
use feature_engine::MoodHeuristics;
use mood_classifier::Mood;
use mood_engine::{DebugBundle, DetectionResult, TickStatus};
use serde::{Deserialize, Serialize};

/// Latest detection state as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceState {
    pub is_loaded: bool,
    pub is_detecting: bool,
    pub mood: Mood,
    /// Detector confidence of the last face
    pub score: f32,
    pub slouch_detected: bool,
    pub distracted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugBundle>,
}

/// Self-reported state used while the camera is off
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualInput {
    pub mood: Mood,
    pub slouch_detected: bool,
    pub distracted: bool,
}

impl FaceState {
    /// Fold a detection result in. Skipped ticks change nothing and a
    /// result without a mood keeps the previous one.
    pub fn apply(&mut self, result: &DetectionResult) {
        if result.status == TickStatus::Skipped {
            return;
        }
        if let Some(mood) = result.mood {
            self.mood = mood;
        }
        self.score = result.confidence;
        self.slouch_detected = result.slouch_detected;
        self.distracted = result.distracted;
        self.debug = result.debug.clone();
    }

    /// Replace the detected values with manual input
    pub fn apply_manual(&mut self, input: &ManualInput) {
        self.is_loaded = true;
        self.is_detecting = true;
        self.mood = input.mood;
        self.score = 1.0;
        self.slouch_detected = input.slouch_detected;
        self.distracted = input.distracted;
        self.debug = Some(DebugBundle {
            expressions: Expressions::default(),
            heuristics: MoodHeuristics {
                eye_openness: 1.0,
                ..Default::default()
            },
        });
    }

    /// Whether this second counts as focused time
    pub fn is_focused(&self) -> bool {
        !self.distracted && !self.slouch_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(mood: Mood) -> DetectionResult {
        DetectionResult {
            status: TickStatus::Detected,
            mood: Some(mood),
            confidence: 0.8,
            debug: Some(DebugBundle::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_face_keeps_previous_mood() {
        let mut state = FaceState::default();
        state.apply(&detected(Mood::Happy));
        state.apply(&DetectionResult::no_face(0.5));

        assert_eq!(state.mood, Mood::Happy);
        assert!(state.distracted);
        assert_eq!(state.score, 0.0);
        assert!(!state.is_focused());
    }

    #[test]
    fn test_skipped_changes_nothing() {
        let mut state = FaceState::default();
        state.apply(&detected(Mood::Tired));
        let before = state.clone();

        state.apply(&DetectionResult::skipped());
        assert_eq!(state, before);
    }

    #[test]
    fn test_manual_input() {
        let mut state = FaceState::default();
        state.apply_manual(&ManualInput {
            mood: Mood::Stressed,
            slouch_detected: true,
            distracted: false,
        });

        assert!(state.is_loaded);
        assert_eq!(state.mood, Mood::Stressed);
        assert_eq!(state.score, 1.0);
        assert!(!state.is_focused());
        assert_eq!(state.debug.unwrap().heuristics.eye_openness, 1.0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut state = FaceState::default();
        state.apply(&detected(Mood::Focused));
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["mood"], "FOCUSED");
        assert!(json.get("error").is_none());
        assert!(json["debug"]["heuristics"].is_object());
    }
}
