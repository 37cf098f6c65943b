//! Mood values

use face_signals::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing mood classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    Focused,
    Happy,
    #[default]
    Neutral,
    Stressed,
    Tired,
    Bored,
    Sad,
    Frustrated,
    Surprised,
}

impl Mood {
    pub const ALL: [Mood; 9] = [
        Mood::Focused,
        Mood::Happy,
        Mood::Neutral,
        Mood::Stressed,
        Mood::Tired,
        Mood::Bored,
        Mood::Sad,
        Mood::Frustrated,
        Mood::Surprised,
    ];

    /// Direct mapping used when no rule matched
    pub fn from_expression(expression: Expression) -> Self {
        match expression {
            Expression::Happy => Mood::Happy,
            Expression::Sad => Mood::Sad,
            Expression::Angry => Mood::Frustrated,
            Expression::Fearful => Mood::Stressed,
            Expression::Disgusted => Mood::Bored,
            Expression::Surprised => Mood::Surprised,
            Expression::Neutral => Mood::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Focused => "FOCUSED",
            Mood::Happy => "HAPPY",
            Mood::Neutral => "NEUTRAL",
            Mood::Stressed => "STRESSED",
            Mood::Tired => "TIRED",
            Mood::Bored => "BORED",
            Mood::Sad => "SAD",
            Mood::Frustrated => "FRUSTRATED",
            Mood::Surprised => "SURPRISED",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Mood::Frustrated).unwrap(), "\"FRUSTRATED\"");
        let mood: Mood = serde_json::from_str("\"FOCUSED\"").unwrap();
        assert_eq!(mood, Mood::Focused);
    }

    #[test]
    fn test_display_matches_serde() {
        for mood in Mood::ALL {
            assert_eq!(
                serde_json::to_string(&mood).unwrap(),
                format!("\"{}\"", mood)
            );
        }
    }
}
