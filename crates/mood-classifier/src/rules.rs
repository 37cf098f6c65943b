//! Mood rule cascade

use crate::{Mood, MoodThresholds};
use face_signals::Expressions;
use feature_engine::MoodHeuristics;

/// Map one expression snapshot plus heuristics to a mood.
///
/// Rules are checked in priority order and the first match wins:
/// happy, surprised, stressed, frustrated, sad, tired, bored, focused,
/// neutral, then the dominant expression.
pub fn classify(expressions: &Expressions, heuristics: &MoodHeuristics, t: &MoodThresholds) -> Mood {
    let e = expressions;
    let h = heuristics;

    // 1. Happy: strong expression, or a weaker one backed by a visible smile
    if e.happy >= t.happy_expression
        || (e.happy > t.happy_with_smile && h.smile_curvature >= t.smile_curvature)
    {
        return Mood::Happy;
    }

    // 2. Surprised
    if e.surprised >= t.surprised_expression {
        return Mood::Surprised;
    }

    // 3. Stressed
    if e.fearful >= t.stressed_fear_expression {
        return Mood::Stressed;
    }

    // 4. Frustrated
    if e.angry >= t.frustrated_angry_expression
        || (e.angry > t.frustrated_angry_with_brow && h.brow_lowering > t.frustrated_brow)
    {
        return Mood::Frustrated;
    }

    // 5. Sad
    if e.sad >= t.sad_expression {
        return Mood::Sad;
    }

    // 6. Tired: rapid blinking or drooping (but measured) eyes
    if h.blink_rate > t.tired_blink_rate
        || (h.eye_openness < t.tired_eye_openness && h.eye_openness > t.tired_eye_openness_floor)
    {
        return Mood::Tired;
    }

    // 7. Bored: frequent looking away, or disgust over a neutral face
    if h.gaze_away_ratio > t.bored_gaze
        || (e.disgusted > t.bored_disgust_expression && e.neutral > t.bored_disgust_neutral)
    {
        return Mood::Bored;
    }

    // 8. Focused, only while looking at the screen
    if h.gaze_away_ratio < t.looking_at_screen_gaze {
        let stable_blink = h.blink_rate < t.stable_blink_rate;
        let concentrating = (e.angry > t.concentrating_angry_min
            && e.angry < t.concentrating_angry_max)
            || h.brow_lowering > t.concentrating_brow;

        if concentrating && stable_blink && e.happy < t.focused_max_happy {
            return Mood::Focused;
        }
        if e.neutral >= t.focus_min_neutral && stable_blink {
            return Mood::Focused;
        }
    }

    // 9. Neutral
    if e.neutral > t.neutral_expression {
        return Mood::Neutral;
    }

    // 10. Dominant expression
    expressions
        .dominant()
        .map_or(Mood::Neutral, |(expression, _)| Mood::from_expression(expression))
}
