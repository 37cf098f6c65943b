//! Face Signals
//!
//! Types for the per-tick output of an external face landmark/expression
//! detector, and the capability trait the mood engine drives it through:
//! - 68-point landmark groups (eyes, brows, nose, mouth, jaw)
//! - Expression probabilities
//! - `FaceDetector`: load once, then submit frame -> observation or "no face"
//! - `ReplayDetector`: scripted/recorded observations for tests and offline runs

pub mod landmarks;
pub mod observation;
pub mod replay;

pub use landmarks::{FaceLandmarks, LandmarkGroup, Point};
pub use observation::{Expression, Expressions, RawFrameObservation};
pub use replay::{ReplayDetector, ReplayFrame};

use std::future::Future;
use thiserror::Error;

/// Detector error types
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capability of an external face landmark/expression detector.
///
/// `load` is a one-time, possibly slow step (model download/initialization).
/// `detect` submits one frame and resolves to `None` when no face is found.
pub trait FaceDetector {
    /// Visual frame type accepted by the detector
    type Frame;

    fn load(&mut self) -> impl Future<Output = Result<(), DetectorError>> + Send;

    fn detect(
        &mut self,
        frame: &Self::Frame,
    ) -> impl Future<Output = Result<Option<RawFrameObservation>, DetectorError>> + Send;
}
