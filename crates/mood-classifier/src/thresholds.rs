//! Classifier thresholds

use serde::{Deserialize, Serialize};

/// Every cut-off the rule cascade uses. Defaults are the tuned values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodThresholds {
    // Happy
    pub happy_expression: f32,
    pub happy_with_smile: f32,
    pub smile_curvature: f32,

    // Surprised / Stressed
    pub surprised_expression: f32,
    pub stressed_fear_expression: f32,

    // Frustrated
    pub frustrated_angry_expression: f32,
    pub frustrated_angry_with_brow: f32,
    pub frustrated_brow: f32,

    // Sad
    pub sad_expression: f32,

    // Tired
    pub tired_blink_rate: f32,
    pub tired_eye_openness: f32,
    /// EAR at or below this is treated as a missing measurement, not drowsiness
    pub tired_eye_openness_floor: f32,

    // Bored
    pub bored_gaze: f32,
    pub bored_disgust_expression: f32,
    pub bored_disgust_neutral: f32,

    // Focused
    pub looking_at_screen_gaze: f32,
    pub stable_blink_rate: f32,
    pub concentrating_angry_min: f32,
    pub concentrating_angry_max: f32,
    pub concentrating_brow: f32,
    pub focused_max_happy: f32,
    pub focus_min_neutral: f32,

    // Neutral
    pub neutral_expression: f32,
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            happy_expression: 0.4,
            happy_with_smile: 0.2,
            smile_curvature: 0.15,

            surprised_expression: 0.5,
            stressed_fear_expression: 0.4,

            frustrated_angry_expression: 0.4,
            frustrated_angry_with_brow: 0.3,
            frustrated_brow: 0.35,

            sad_expression: 0.4,

            tired_blink_rate: 40.0,
            tired_eye_openness: 0.30,
            tired_eye_openness_floor: 0.05,

            bored_gaze: 0.3,
            bored_disgust_expression: 0.4,
            bored_disgust_neutral: 0.2,

            looking_at_screen_gaze: 0.15,
            stable_blink_rate: 35.0,
            concentrating_angry_min: 0.05,
            concentrating_angry_max: 0.4,
            concentrating_brow: 0.1,
            focused_max_happy: 0.2,
            focus_min_neutral: 0.3,

            neutral_expression: 0.3,
        }
    }
}
