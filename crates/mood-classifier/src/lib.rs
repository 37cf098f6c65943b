//! Mood Classification
//!
//! Pure, ordered rule cascade over expression probabilities and facial
//! heuristics. The first matching rule wins; when none match, the dominant
//! expression is mapped directly.

mod mood;
mod rules;
mod thresholds;

pub use mood::Mood;
pub use rules::classify;
pub use thresholds::MoodThresholds;
