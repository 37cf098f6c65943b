//! Session Sampler
//!
//! Drives a `MoodEngine` on a fixed cadence and keeps the caller-facing view:
//! - `DetectionSampler`: interval loop with calibration commands and mode switching
//! - `FaceState`: latest display state (previous mood kept across gaps)
//! - `SessionTally`: per-second focus/distraction accounting and final score

mod face_state;
mod sampler;
mod tally;

pub use face_state::{FaceState, ManualInput};
pub use sampler::{DetectionSampler, SamplerConfig, SamplerHandle, SamplingMode};
pub use tally::{SessionMetric, SessionSummary, SessionTally};

use mood_engine::EngineError;
use thiserror::Error;

/// Sampler error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Sampler is no longer running")]
    Closed,
}
