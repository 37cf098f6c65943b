//! Posture Calibration
//!
//! Stores a baseline (normalized nose height, normalized face height) and
//! flags slouching when the nose drops below it by more than a fraction of
//! the baseline face height. Scaling by face height keeps the test invariant
//! to how close the subject sits to the camera.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Posture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Allowed nose drop, as a fraction of the baseline face height
    pub slouch_coefficient: f32,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            slouch_coefficient: 0.25,
        }
    }
}

/// One posture measurement (both values normalized by frame height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureSample {
    pub nose_y: f32,
    pub face_height: f32,
}

/// Posture calibrator and slouch detector
#[derive(Debug, Clone, Default)]
pub struct PostureCalibrator {
    config: PostureConfig,
    /// Calibration anchor; only set by calibration
    baseline: Option<PostureSample>,
    /// Most recent face measurement, the source for `calibrate_to_current`
    last_observed: Option<PostureSample>,
}

impl PostureCalibrator {
    pub fn new(config: PostureConfig) -> Self {
        Self {
            config,
            baseline: None,
            last_observed: None,
        }
    }

    /// Overwrite the baseline
    pub fn calibrate(&mut self, nose_y: f32, face_height: f32) {
        self.baseline = Some(PostureSample {
            nose_y,
            face_height,
        });
        info!(
            "Posture calibrated. Baseline nose Y: {:.3}, face height: {:.3}",
            nose_y, face_height
        );
    }

    /// Calibrate from the most recent face measurement.
    /// Returns false, changing nothing, when no face has been observed yet.
    pub fn calibrate_to_current(&mut self) -> bool {
        match self.last_observed {
            Some(sample) => {
                self.calibrate(sample.nose_y, sample.face_height);
                true
            }
            None => {
                warn!("Cannot calibrate: no face observed yet");
                false
            }
        }
    }

    /// Record a face measurement and test it for slouching.
    ///
    /// Without a baseline this measurement becomes the baseline and the
    /// result is `false`.
    pub fn observe(&mut self, nose_y: f32, face_height: f32) -> bool {
        self.last_observed = Some(PostureSample {
            nose_y,
            face_height,
        });

        match self.baseline {
            None => {
                self.calibrate(nose_y, face_height);
                false
            }
            Some(_) => self.is_slouching(nose_y),
        }
    }

    /// Slouch test against the baseline; false when uncalibrated
    pub fn is_slouching(&self, nose_y: f32) -> bool {
        match self.baseline {
            Some(baseline) => nose_y > baseline.nose_y + self.threshold(baseline.face_height),
            None => false,
        }
    }

    /// Allowed nose drop for a given baseline face height
    pub fn threshold(&self, baseline_face_height: f32) -> f32 {
        baseline_face_height * self.config.slouch_coefficient
    }

    pub fn baseline(&self) -> Option<PostureSample> {
        self.baseline
    }

    pub fn last_observed(&self) -> Option<PostureSample> {
        self.last_observed
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn config(&self) -> &PostureConfig {
        &self.config
    }

    /// Forget baseline and observations
    pub fn reset(&mut self) {
        self.baseline = None;
        self.last_observed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slouch_boundary() {
        let mut calibrator = PostureCalibrator::new(PostureConfig::default());
        calibrator.calibrate(0.5, 0.3);

        // Threshold 0.075: exactly at the boundary is not slouching
        assert!(!calibrator.observe(0.575, 0.3));
        assert!(calibrator.observe(0.576, 0.3));
        assert!(!calibrator.observe(0.4, 0.3));
    }

    #[test]
    fn test_calibrate_to_current_without_observation() {
        let mut calibrator = PostureCalibrator::default();
        assert!(!calibrator.calibrate_to_current());
        assert!(calibrator.baseline().is_none());
    }

    #[test]
    fn test_first_observation_auto_calibrates() {
        let mut calibrator = PostureCalibrator::new(PostureConfig::default());
        assert!(!calibrator.is_slouching(0.9));

        assert!(!calibrator.observe(0.45, 0.2));
        assert_eq!(
            calibrator.baseline(),
            Some(PostureSample {
                nose_y: 0.45,
                face_height: 0.2
            })
        );
    }

    #[test]
    fn test_observations_do_not_move_baseline() {
        let mut calibrator = PostureCalibrator::new(PostureConfig::default());
        calibrator.observe(0.5, 0.3);
        calibrator.observe(0.7, 0.35);
        calibrator.observe(0.2, 0.1);

        assert_eq!(calibrator.baseline().unwrap().nose_y, 0.5);
        assert_eq!(calibrator.last_observed().unwrap().nose_y, 0.2);
    }

    #[test]
    fn test_calibrate_to_current_uses_last_observation() {
        let mut calibrator = PostureCalibrator::new(PostureConfig::default());
        calibrator.observe(0.5, 0.3);
        assert!(calibrator.observe(0.7, 0.3));

        assert!(calibrator.calibrate_to_current());
        assert_eq!(calibrator.baseline().unwrap().nose_y, 0.7);
        assert!(!calibrator.observe(0.7, 0.3));
    }

    #[test]
    fn test_coefficient_is_configurable() {
        let mut calibrator = PostureCalibrator::new(PostureConfig {
            slouch_coefficient: 0.1,
        });
        calibrator.calibrate(0.5, 0.3);
        assert!(calibrator.observe(0.54, 0.3));
    }
}
