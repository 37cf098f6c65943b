//! Mood Detection Engine
//!
//! Per-tick study-session state inference from face detector output:
//! - Mood classification (expressions + heuristics)
//! - Blink rate and gaze tracking over rolling windows
//! - Slouch detection against a calibrated baseline
//! - Distraction (no face in frame)

pub mod analysis;
pub mod config;
pub mod state;

pub use analysis::{DebugBundle, DetectionResult, TickStatus};
pub use config::EngineConfig;
pub use state::RollingState;

use face_signals::{FaceDetector, RawFrameObservation};
use feature_engine::FrameGeometry;
use mood_classifier::classify;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Detector resources failed to load: {0}")]
    ResourceLoad(String),

    #[error("Detector load timed out after {0} ms")]
    LoadTimeout(u64),

    #[error("Detector not loaded")]
    NotLoaded,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Ticks without a face before the absence is logged
const FACE_ABSENT_LOG_TICKS: u32 = 30;

/// Mood, posture, and attention inference over one detector
pub struct MoodEngine<D: FaceDetector> {
    detector: D,
    config: EngineConfig,
    state: RollingState,
    loaded: bool,
    /// Reference point for the millisecond clock fed to the rolling state
    origin: Instant,
}

impl<D: FaceDetector> MoodEngine<D> {
    /// Create an engine; the detector is not loaded yet
    pub fn new(detector: D, config: EngineConfig) -> Self {
        Self {
            state: RollingState::new(&config),
            detector,
            config,
            loaded: false,
            origin: Instant::now(),
        }
    }

    /// Load detector resources, bounded by the configured timeout.
    /// Calling again after a successful load is a no-op.
    pub async fn load_detector(&mut self) -> Result<(), EngineError> {
        if self.loaded {
            debug!("Detector already loaded");
            return Ok(());
        }

        let timeout_ms = self.config.load_timeout_ms;
        info!("Loading face detector (timeout {} ms)", timeout_ms);

        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.detector.load()).await {
            Ok(Ok(())) => {
                self.loaded = true;
                info!("Face detector loaded");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Failed to load face detector: {}", e);
                Err(EngineError::ResourceLoad(e.to_string()))
            }
            Err(_) => {
                error!("Face detector load timed out after {} ms", timeout_ms);
                Err(EngineError::LoadTimeout(timeout_ms))
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Run the detector on one frame and fold the output into the rolling state.
    ///
    /// Detector and geometry faults are logged and produce a skipped result;
    /// the only error is calling this before the detector has loaded.
    pub async fn detect_tick(&mut self, frame: &D::Frame) -> Result<DetectionResult, EngineError> {
        if !self.loaded {
            return Err(EngineError::NotLoaded);
        }

        let detected = self.detector.detect(frame).await;
        let now_ms = self.elapsed_ms();

        match detected {
            Ok(observation) => Ok(self.observe(observation.as_ref(), now_ms)),
            Err(e) => {
                warn!("Face detection failed, skipping tick: {}", e);
                self.state.ticks += 1;
                metrics::counter!("mood_engine_ticks_total").increment(1);
                metrics::counter!("mood_engine_skipped_total").increment(1);
                Ok(DetectionResult::skipped())
            }
        }
    }

    /// Fold one detector output (or its absence) into the rolling state.
    ///
    /// `now_ms` is a monotonic millisecond timestamp used for blink windowing.
    pub fn observe(&mut self, observation: Option<&RawFrameObservation>, now_ms: u64) -> DetectionResult {
        self.state.ticks += 1;
        metrics::counter!("mood_engine_ticks_total").increment(1);

        let Some(observation) = observation else {
            return self.observe_no_face();
        };

        // Everything is measured before any rolling state is touched
        let geometry = match FrameGeometry::measure(observation) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!("Skipping tick: {}", e);
                metrics::counter!("mood_engine_skipped_total").increment(1);
                return DetectionResult::skipped();
            }
        };

        self.state.face_absent_ticks = 0;

        let blink_rate = self.state.blink.update(geometry.ear, now_ms);
        let looking_away = self.config.heuristics.is_looking_away(observation.score);
        let gaze_away_ratio = self.state.gaze.record(looking_away);
        let heuristics = geometry.heuristics(blink_rate, gaze_away_ratio);

        let mood = classify(&observation.expressions, &heuristics, &self.config.thresholds);
        let slouch_detected = self
            .state
            .posture
            .observe(geometry.nose_y, geometry.face_height);

        debug!(
            "Tick {}: mood={} blink_rate={:.1} gaze_away={:.2} slouch={}",
            self.state.ticks, mood, blink_rate, gaze_away_ratio, slouch_detected
        );

        DetectionResult {
            status: TickStatus::Detected,
            mood: Some(mood),
            slouch_detected,
            distracted: false,
            confidence: observation.score,
            debug: Some(DebugBundle {
                expressions: observation.expressions,
                heuristics,
            }),
        }
    }

    fn observe_no_face(&mut self) -> DetectionResult {
        metrics::counter!("mood_engine_no_face_total").increment(1);
        self.state.face_absent_ticks = self.state.face_absent_ticks.saturating_add(1);
        if self.state.face_absent_ticks == FACE_ABSENT_LOG_TICKS {
            info!("No face visible for {} consecutive ticks", FACE_ABSENT_LOG_TICKS);
        }

        let ratio = self.state.gaze.record(true);
        debug!("Tick {}: no face, gaze_away={:.2}", self.state.ticks, ratio);
        DetectionResult::no_face(ratio)
    }

    /// Set the posture baseline explicitly
    pub fn calibrate(&mut self, nose_y: f32, face_height: f32) {
        self.state.posture.calibrate(nose_y, face_height);
    }

    /// Adopt the last observed posture as the baseline.
    /// Returns false when no face has been observed yet.
    pub fn calibrate_to_current(&mut self) -> bool {
        self.state.posture.calibrate_to_current()
    }

    pub fn state(&self) -> &RollingState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forget all rolling state and calibration (new subject)
    pub fn reset_state(&mut self) {
        info!("Resetting rolling state");
        self.state.reset();
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Milliseconds since the engine was created
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_signals::replay::LoadBehavior;
    use face_signals::{Expressions, FaceLandmarks, Point, ReplayDetector, ReplayFrame};
    use mood_classifier::Mood;

    /// 68-point face with EAR 0.3 and the nose tip at `nose_y` px in a 480px frame
    fn face(nose_y: f32, expressions: Expressions) -> RawFrameObservation {
        let mut points = vec![Point::new(0.0, 0.0); 68];
        for base in [36, 42] {
            points[base] = Point::new(0.0, 200.0);
            points[base + 1] = Point::new(3.0, 198.5);
            points[base + 2] = Point::new(7.0, 198.5);
            points[base + 3] = Point::new(10.0, 200.0);
            points[base + 4] = Point::new(7.0, 201.5);
            points[base + 5] = Point::new(3.0, 201.5);
        }
        points[19] = Point::new(3.0, 190.0);
        points[27] = Point::new(0.0, 200.0);
        points[30] = Point::new(0.0, nose_y);
        points[8] = Point::new(0.0, 300.0);
        points[48] = Point::new(-20.0, 260.0);
        points[54] = Point::new(20.0, 260.0);
        points[57] = Point::new(0.0, 270.0);

        RawFrameObservation {
            score: 0.93,
            box_height: 160.0,
            frame_height: 480.0,
            landmarks: FaceLandmarks::from_points(&points).unwrap(),
            expressions,
        }
    }

    fn neutral() -> Expressions {
        Expressions {
            neutral: 0.9,
            ..Default::default()
        }
    }

    fn engine() -> MoodEngine<ReplayDetector> {
        MoodEngine::new(ReplayDetector::new(vec![]), EngineConfig::default())
    }

    #[test]
    fn test_detected_tick() {
        let mut engine = engine();
        let result = engine.observe(Some(&face(240.0, neutral())), 0);

        assert_eq!(result.status, TickStatus::Detected);
        assert_eq!(result.mood, Some(Mood::Focused));
        assert!(!result.distracted);
        assert!(!result.slouch_detected);
        assert_eq!(result.confidence, 0.93);

        let heuristics = result.heuristics().unwrap();
        assert!((heuristics.eye_openness - 0.3).abs() < 1e-5);
        assert_eq!(heuristics.gaze_away_ratio, 0.0);
        // First face becomes the baseline
        assert!(engine.state().posture.is_calibrated());
    }

    #[test]
    fn test_no_face_ticks_saturate_gaze() {
        let mut engine = engine();
        let mut last = DetectionResult::default();
        for tick in 0..10 {
            last = engine.observe(None, tick * 500);
        }

        assert_eq!(last.status, TickStatus::NoFace);
        assert!(last.mood.is_none());
        assert!(last.distracted);
        assert_eq!(last.heuristics().unwrap().gaze_away_ratio, 1.0);
        assert_eq!(engine.state().face_absent_ticks, 10);
    }

    #[test]
    fn test_gaze_ratio_mixes_face_and_absence() {
        let mut engine = engine();
        engine.observe(Some(&face(240.0, neutral())), 0);
        engine.observe(None, 500);
        engine.observe(None, 1000);
        let result = engine.observe(Some(&face(240.0, neutral())), 1500);

        assert_eq!(result.heuristics().unwrap().gaze_away_ratio, 0.5);
        assert_eq!(engine.state().face_absent_ticks, 0);
    }

    #[test]
    fn test_slouch_after_baseline() {
        let mut engine = engine();
        engine.calibrate(0.5, 0.3);

        // threshold: 0.5 + 0.3 * 0.25 = 0.575, i.e. 276px of 480
        let upright = engine.observe(Some(&face(270.0, neutral())), 0);
        assert!(!upright.slouch_detected);

        let slouched = engine.observe(Some(&face(290.0, neutral())), 500);
        assert!(slouched.slouch_detected);
    }

    #[test]
    fn test_calibrate_to_current_requires_face() {
        let mut engine = engine();
        assert!(!engine.calibrate_to_current());
        assert!(!engine.state().posture.is_calibrated());

        engine.observe(None, 0);
        assert!(!engine.calibrate_to_current());

        engine.observe(Some(&face(240.0, neutral())), 500);
        engine.observe(Some(&face(300.0, neutral())), 1000);
        assert!(engine.calibrate_to_current());
        let baseline = engine.state().posture.baseline().unwrap();
        assert!((baseline.nose_y - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_observation_leaves_state_untouched() {
        let mut engine = engine();
        engine.observe(Some(&face(240.0, neutral())), 0);

        let mut broken = face(240.0, neutral());
        broken.landmarks.left_eye.truncate(2);
        let result = engine.observe(Some(&broken), 500);

        assert!(result.is_skipped());
        assert_eq!(engine.state().gaze.len(), 1);
        assert_eq!(engine.state().blink.event_count(), 0);
    }

    #[test]
    fn test_reset_state() {
        let mut engine = engine();
        engine.observe(Some(&face(240.0, neutral())), 0);
        engine.observe(None, 500);
        engine.reset_state();

        assert!(engine.state().gaze.is_empty());
        assert!(!engine.state().posture.is_calibrated());
        assert_eq!(engine.state().ticks, 0);
    }

    #[tokio::test]
    async fn test_detect_before_load_fails() {
        let mut engine = engine();
        assert_eq!(engine.detect_tick(&()).await, Err(EngineError::NotLoaded));
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let mut engine = engine();
        engine.load_detector().await.unwrap();
        engine.load_detector().await.unwrap();
        assert!(engine.is_loaded());
        assert_eq!(engine.detector().load_calls(), 1);
    }

    #[tokio::test]
    async fn test_load_failure() {
        let detector = ReplayDetector::new(vec![])
            .with_load_behavior(LoadBehavior::Fail("model weights missing".into()));
        let mut engine = MoodEngine::new(detector, EngineConfig::default());

        let result = engine.load_detector().await;
        assert!(matches!(result, Err(EngineError::ResourceLoad(ref msg)) if msg.contains("weights")));
        assert!(!engine.is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout() {
        let detector = ReplayDetector::new(vec![])
            .with_load_behavior(LoadBehavior::Stall(Duration::from_secs(60)));
        let config = EngineConfig {
            load_timeout_ms: 2_000,
            ..Default::default()
        };
        let mut engine = MoodEngine::new(detector, config);

        assert_eq!(engine.load_detector().await, Err(EngineError::LoadTimeout(2_000)));
        assert!(!engine.is_loaded());
    }

    #[tokio::test]
    async fn test_detector_fault_is_skipped() {
        let detector = ReplayDetector::new(vec![
            ReplayFrame::Fault {
                message: "tensor shape mismatch".into(),
            },
            ReplayFrame::NoFace,
        ]);
        let mut engine = MoodEngine::new(detector, EngineConfig::default());
        engine.load_detector().await.unwrap();

        let faulted = engine.detect_tick(&()).await.unwrap();
        assert!(faulted.is_skipped());
        assert!(engine.state().gaze.is_empty());

        let absent = engine.detect_tick(&()).await.unwrap();
        assert_eq!(absent.status, TickStatus::NoFace);
        assert_eq!(engine.state().ticks, 2);
    }

    proptest::proptest! {
        #[test]
        fn prop_gaze_ratio_bounded(present in proptest::collection::vec(proptest::bool::ANY, 1..80)) {
            let mut engine = engine();
            for (i, face_present) in present.iter().enumerate() {
                let observation = face(240.0, neutral());
                let result = engine.observe(face_present.then_some(&observation), i as u64 * 500);
                let ratio = result.heuristics().unwrap().gaze_away_ratio;
                proptest::prop_assert!((0.0..=1.0).contains(&ratio));
                proptest::prop_assert_eq!(result.distracted, !face_present);
            }
            proptest::prop_assert!(engine.state().gaze.len() <= 30);
        }
    }
}
