//! Facial landmark groups (68-point layout)

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D landmark position in source-frame pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Named landmark group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkGroup {
    Jaw,
    LeftEyebrow,
    RightEyebrow,
    Nose,
    LeftEye,
    RightEye,
    Mouth,
}

impl LandmarkGroup {
    /// Number of points the group carries in the 68-point layout
    pub const fn expected_len(&self) -> usize {
        match self {
            LandmarkGroup::Jaw => 17,
            LandmarkGroup::LeftEyebrow | LandmarkGroup::RightEyebrow => 5,
            LandmarkGroup::Nose => 9,
            LandmarkGroup::LeftEye | LandmarkGroup::RightEye => 6,
            LandmarkGroup::Mouth => 20,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkGroup::Jaw => "jaw",
            LandmarkGroup::LeftEyebrow => "left_eyebrow",
            LandmarkGroup::RightEyebrow => "right_eyebrow",
            LandmarkGroup::Nose => "nose",
            LandmarkGroup::LeftEye => "left_eye",
            LandmarkGroup::RightEye => "right_eye",
            LandmarkGroup::Mouth => "mouth",
        }
    }
}

impl fmt::Display for LandmarkGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known indices within each group
pub mod indices {
    /// Chin tip (jaw group)
    pub const CHIN_TIP: usize = 8;
    /// Top of the nose bridge (nose group)
    pub const NOSE_BRIDGE: usize = 0;
    /// Nose tip (nose group)
    pub const NOSE_TIP: usize = 3;
    /// Middle of the eyebrow arch (eyebrow groups)
    pub const BROW_ARCH: usize = 2;
    /// Upper eyelid point under the brow arch (eye groups)
    pub const EYE_UPPER_LID: usize = 1;

    // Mouth group (outer contour 0..=11, inner contour 12..=19)
    pub const MOUTH_LEFT_CORNER: usize = 0;
    pub const MOUTH_RIGHT_CORNER: usize = 6;
    pub const MOUTH_OUTER_UPPER: usize = 3;
    pub const MOUTH_OUTER_LOWER: usize = 9;
    pub const MOUTH_INNER_UPPER: usize = 14;
    pub const MOUTH_INNER_LOWER: usize = 18;
}

/// Landmark groups of one detected face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub jaw: Vec<Point>,
    pub left_eyebrow: Vec<Point>,
    pub right_eyebrow: Vec<Point>,
    pub nose: Vec<Point>,
    /// Six contour points, clockwise from the outer corner
    pub left_eye: Vec<Point>,
    /// Six contour points, clockwise from the outer corner
    pub right_eye: Vec<Point>,
    pub mouth: Vec<Point>,
}

impl FaceLandmarks {
    /// Points of a group
    pub fn group(&self, group: LandmarkGroup) -> &[Point] {
        match group {
            LandmarkGroup::Jaw => &self.jaw,
            LandmarkGroup::LeftEyebrow => &self.left_eyebrow,
            LandmarkGroup::RightEyebrow => &self.right_eyebrow,
            LandmarkGroup::Nose => &self.nose,
            LandmarkGroup::LeftEye => &self.left_eye,
            LandmarkGroup::RightEye => &self.right_eye,
            LandmarkGroup::Mouth => &self.mouth,
        }
    }

    /// Single point of a group, if present
    pub fn point(&self, group: LandmarkGroup, index: usize) -> Option<Point> {
        self.group(group).get(index).copied()
    }

    /// Build from a flat 68-point list (dlib / face-api ordering)
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.len() < 68 {
            return None;
        }
        Some(Self {
            jaw: points[0..17].to_vec(),
            left_eyebrow: points[17..22].to_vec(),
            right_eyebrow: points[22..27].to_vec(),
            nose: points[27..36].to_vec(),
            left_eye: points[36..42].to_vec(),
            right_eye: points[42..48].to_vec(),
            mouth: points[48..68].to_vec(),
        })
    }
}
