//! Raw per-tick detector observation

use crate::landmarks::FaceLandmarks;
use serde::{Deserialize, Serialize};

/// Expression classes reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Expression {
    /// Stable iteration order (the order the detector reports them in)
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        }
    }
}

/// Expression probabilities (each in [0, 1], not required to sum to 1).
/// Missing keys deserialize as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expressions {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl Expressions {
    /// Probability of one expression
    pub fn get(&self, expression: Expression) -> f32 {
        match expression {
            Expression::Neutral => self.neutral,
            Expression::Happy => self.happy,
            Expression::Sad => self.sad,
            Expression::Angry => self.angry,
            Expression::Fearful => self.fearful,
            Expression::Disgusted => self.disgusted,
            Expression::Surprised => self.surprised,
        }
    }

    /// (expression, probability) pairs in `Expression::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Expression, f32)> + '_ {
        Expression::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// Highest-probability expression; ties go to the first in iteration order.
    /// NaN entries are ignored. `None` only when every entry is NaN.
    pub fn dominant(&self) -> Option<(Expression, f32)> {
        self.iter()
            .filter(|(_, p)| !p.is_nan())
            .fold(None::<(Expression, f32)>, |best, (expression, p)| match best {
                Some((_, best_p)) if p <= best_p => best,
                _ => Some((expression, p)),
            })
    }
}

/// One detected face, as reported by the external detector for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrameObservation {
    /// Detection confidence score
    pub score: f32,
    /// Face bounding-box height (pixels)
    pub box_height: f32,
    /// Source frame height (pixels), used to normalize positions
    pub frame_height: f32,
    pub landmarks: FaceLandmarks,
    pub expressions: Expressions,
}
