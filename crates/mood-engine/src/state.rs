//! Rolling per-session state

use crate::EngineConfig;
use feature_engine::{BlinkTracker, GazeTracker};
use posture::PostureCalibrator;

/// Rolling state tracked across ticks; owned by one engine
#[derive(Debug, Clone)]
pub struct RollingState {
    /// Blink events and previous EAR
    pub blink: BlinkTracker,

    /// Recent looking-away samples
    pub gaze: GazeTracker,

    /// Posture baseline and last observed measurement
    pub posture: PostureCalibrator,

    /// Consecutive ticks without a face
    pub face_absent_ticks: u32,

    /// Ticks processed (including skipped ones)
    pub ticks: u64,
}

impl RollingState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            blink: BlinkTracker::new(
                config.heuristics.blink_ear_threshold,
                config.heuristics.blink_window_ms,
            ),
            gaze: GazeTracker::new(config.heuristics.gaze_capacity),
            posture: PostureCalibrator::new(config.posture.clone()),
            face_absent_ticks: 0,
            ticks: 0,
        }
    }

    /// Clear history and calibration (new subject)
    pub fn reset(&mut self) {
        self.blink.reset();
        self.gaze.reset();
        self.posture.reset();
        self.face_absent_ticks = 0;
        self.ticks = 0;
    }
}

impl Default for RollingState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
