//! Replay detector: feeds recorded or scripted observations through the
//! `FaceDetector` capability, one entry per `detect` call.

use crate::{DetectorError, FaceDetector, RawFrameObservation};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// One scripted detector response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayFrame {
    /// A face was found
    Face(RawFrameObservation),
    /// Nothing found in the frame
    NoFace,
    /// Detector raised an internal fault
    Fault { message: String },
}

/// How `load` behaves
#[derive(Debug, Clone, PartialEq)]
pub enum LoadBehavior {
    Succeed,
    Fail(String),
    /// Sleep before succeeding (exercises load timeouts)
    Stall(Duration),
}

/// Detector that replays a fixed script of responses
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    frames: VecDeque<ReplayFrame>,
    load_behavior: LoadBehavior,
    load_calls: usize,
    detect_calls: usize,
}

impl ReplayDetector {
    /// Create a detector that replays `frames` in order
    pub fn new(frames: impl IntoIterator<Item = ReplayFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            load_behavior: LoadBehavior::Succeed,
            load_calls: 0,
            detect_calls: 0,
        }
    }

    /// Parse a JSON-lines script (blank lines are skipped)
    pub fn from_reader(reader: impl BufRead) -> Result<Self, DetectorError> {
        let mut frames = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            frames.push(serde_json::from_str::<ReplayFrame>(line)?);
        }
        Ok(Self::new(frames))
    }

    /// Load a JSON-lines script from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        info!("Loading replay script from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Override the load behavior
    pub fn with_load_behavior(mut self, behavior: LoadBehavior) -> Self {
        self.load_behavior = behavior;
        self
    }

    /// Frames not yet replayed
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls
    }
}

impl FaceDetector for ReplayDetector {
    type Frame = ();

    async fn load(&mut self) -> Result<(), DetectorError> {
        self.load_calls += 1;
        match &self.load_behavior {
            LoadBehavior::Succeed => Ok(()),
            LoadBehavior::Fail(reason) => Err(DetectorError::ModelLoad(reason.clone())),
            LoadBehavior::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
        }
    }

    async fn detect(&mut self, _frame: &()) -> Result<Option<RawFrameObservation>, DetectorError> {
        self.detect_calls += 1;
        match self.frames.pop_front() {
            Some(ReplayFrame::Face(observation)) => Ok(Some(observation)),
            Some(ReplayFrame::NoFace) => Ok(None),
            Some(ReplayFrame::Fault { message }) => Err(DetectorError::Inference(message)),
            None => {
                debug!("Replay script exhausted, reporting no face");
                Ok(None)
            }
        }
    }
}
