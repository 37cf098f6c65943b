//! Heuristic Extraction Engine
//!
//! Derives bounded mood heuristics from one frame's landmark geometry plus
//! rolling blink and gaze history.

mod blink;
mod features;
mod gaze;
pub mod geometry;

pub use blink::BlinkTracker;
pub use features::{FrameGeometry, HeuristicsConfig, MoodHeuristics};
pub use gaze::GazeTracker;

use face_signals::LandmarkGroup;
use thiserror::Error;

/// Errors while measuring a frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// A landmark group lacks a point the heuristics need
    #[error("Landmark {group}[{index}] missing (group has {len} points)")]
    MissingLandmarks {
        group: LandmarkGroup,
        index: usize,
        len: usize,
    },

    /// Frame metadata cannot be used for normalization
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}
