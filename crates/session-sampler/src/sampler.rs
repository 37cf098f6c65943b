//! Detection sampling loop

use crate::{FaceState, ManualInput, SamplerError, SessionSummary, SessionTally};
use face_signals::FaceDetector;
use mood_engine::MoodEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Sampler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Detection cadence in milliseconds (default: 500)
    pub detect_interval_ms: u64,
    /// Session accounting cadence in milliseconds (default: 1000)
    pub tally_interval_ms: u64,
    /// Pending command capacity
    pub command_buffer: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            detect_interval_ms: 500,
            tally_interval_ms: 1000,
            command_buffer: 16,
        }
    }
}

/// Where the display state comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Periodic detection on camera frames
    #[default]
    Camera,
    /// Self-reported state; no detection runs
    Manual,
}

enum Command {
    Calibrate { nose_y: f32, face_height: f32 },
    CalibrateToCurrent(oneshot::Sender<bool>),
    ResetState,
    Manual(ManualInput),
    StartSession,
    PauseSession,
    ResumeSession,
    FinishSession(oneshot::Sender<Option<SessionSummary>>),
}

/// Caller side of a running sampler. Dropping it stops the sampler.
pub struct SamplerHandle {
    commands: mpsc::Sender<Command>,
    mode: Arc<watch::Sender<SamplingMode>>,
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<FaceState>,
}

impl SamplerHandle {
    async fn send(&self, command: Command) -> Result<(), SamplerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SamplerError::Closed)
    }

    /// Adopt the last observed posture as baseline; false when no face was seen yet
    pub async fn calibrate_to_current(&self) -> Result<bool, SamplerError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::CalibrateToCurrent(reply)).await?;
        response.await.map_err(|_| SamplerError::Closed)
    }

    pub async fn calibrate(&self, nose_y: f32, face_height: f32) -> Result<(), SamplerError> {
        self.send(Command::Calibrate {
            nose_y,
            face_height,
        })
        .await
    }

    /// Forget rolling state and calibration
    pub async fn reset_state(&self) -> Result<(), SamplerError> {
        self.send(Command::ResetState).await
    }

    /// Self-reported state, shown while in manual mode
    pub async fn set_manual(&self, input: ManualInput) -> Result<(), SamplerError> {
        self.send(Command::Manual(input)).await
    }

    pub fn set_mode(&self, mode: SamplingMode) {
        self.mode.send_replace(mode);
    }

    pub fn mode(&self) -> SamplingMode {
        *self.mode.borrow()
    }

    pub async fn start_session(&self) -> Result<(), SamplerError> {
        self.send(Command::StartSession).await
    }

    pub async fn pause_session(&self) -> Result<(), SamplerError> {
        self.send(Command::PauseSession).await
    }

    pub async fn resume_session(&self) -> Result<(), SamplerError> {
        self.send(Command::ResumeSession).await
    }

    /// End the current session; `None` if none was started
    pub async fn finish_session(&self) -> Result<Option<SessionSummary>, SamplerError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::FinishSession(reply)).await?;
        response.await.map_err(|_| SamplerError::Closed)
    }

    /// Latest display state
    pub fn state(&self) -> FaceState {
        self.state.borrow().clone()
    }

    /// Watch display state updates
    pub fn subscribe(&self) -> watch::Receiver<FaceState> {
        self.state.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Drives one engine at a fixed cadence. Commands are handled between ticks,
/// so calibration never interleaves with a detection.
pub struct DetectionSampler<D: FaceDetector> {
    engine: MoodEngine<D>,
    config: SamplerConfig,
    commands: mpsc::Receiver<Command>,
    mode_tx: Arc<watch::Sender<SamplingMode>>,
    mode: watch::Receiver<SamplingMode>,
    shutdown: watch::Receiver<bool>,
    state_tx: watch::Sender<FaceState>,
    face: FaceState,
    manual: ManualInput,
    tally: Option<SessionTally>,
}

impl<D: FaceDetector> DetectionSampler<D> {
    /// Create a sampler and the handle that controls it
    pub fn new(engine: MoodEngine<D>, config: SamplerConfig) -> (Self, SamplerHandle) {
        let (commands_tx, commands) = mpsc::channel(config.command_buffer.max(1));
        let (mode_tx, mode) = watch::channel(SamplingMode::Camera);
        let (shutdown_tx, shutdown) = watch::channel(false);
        let (state_tx, state) = watch::channel(FaceState::default());
        let mode_tx = Arc::new(mode_tx);

        let handle = SamplerHandle {
            commands: commands_tx,
            mode: Arc::clone(&mode_tx),
            shutdown: shutdown_tx,
            state,
        };

        let sampler = Self {
            engine,
            config,
            commands,
            mode_tx,
            mode,
            shutdown,
            state_tx,
            face: FaceState::default(),
            manual: ManualInput::default(),
            tally: None,
        };
        (sampler, handle)
    }

    /// Run until shutdown or until the handle is dropped, then hand the engine back.
    ///
    /// `next_frame` supplies the frame for each detection tick; `None` means
    /// the source is not ready and the tick is skipped.
    pub async fn run<F>(mut self, mut next_frame: F) -> Result<MoodEngine<D>, SamplerError>
    where
        F: FnMut() -> Option<D::Frame>,
    {
        info!(
            "Starting detection sampler ({} ms interval)",
            self.config.detect_interval_ms
        );

        if self.current_mode() == SamplingMode::Camera {
            self.initialize().await;
        }

        let detect_period = Duration::from_millis(self.config.detect_interval_ms.max(1));
        let mut detect_ticker = interval_at(Instant::now() + detect_period, detect_period);
        detect_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let tally_period = Duration::from_millis(self.config.tally_interval_ms.max(1));
        let mut tally_ticker = interval_at(Instant::now() + tally_period, tally_period);
        tally_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = detect_ticker.tick() => {
                    if self.camera_active() {
                        match next_frame() {
                            Some(frame) => self.detect(&frame).await?,
                            None => debug!("Frame source not ready, skipping tick"),
                        }
                    }
                }
                _ = tally_ticker.tick() => {
                    if let Some(tally) = self.tally.as_mut() {
                        tally.record_second(&self.face);
                    }
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        info!("Sampler handle dropped");
                        break;
                    }
                },
                changed = self.mode.changed() => {
                    if changed.is_ok() {
                        self.on_mode_change().await;
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.face.is_detecting = false;
        self.publish();
        info!("Detection sampler stopped");
        Ok(self.engine)
    }

    fn current_mode(&self) -> SamplingMode {
        *self.mode.borrow()
    }

    fn camera_active(&self) -> bool {
        self.engine.is_loaded() && self.current_mode() == SamplingMode::Camera
    }

    /// Load the detector; on failure stay usable in manual mode
    async fn initialize(&mut self) {
        match self.engine.load_detector().await {
            Ok(()) => {
                self.face.is_loaded = true;
                self.face.is_detecting = true;
                self.face.error = None;
            }
            Err(e) => {
                warn!("Detector unavailable, falling back to manual mode: {}", e);
                self.face.is_loaded = false;
                self.face.is_detecting = false;
                self.face.error = Some(e.to_string());
                self.mode_tx.send_replace(SamplingMode::Manual);
            }
        }
        self.publish();
    }

    async fn detect(&mut self, frame: &D::Frame) -> Result<(), SamplerError> {
        let result = self.engine.detect_tick(frame).await?;

        if self.current_mode() != SamplingMode::Camera {
            debug!("Mode switched during detection, discarding result");
            return Ok(());
        }

        self.face.apply(&result);
        if let Some(tally) = self.tally.as_mut() {
            tally.note_posture(self.face.slouch_detected);
        }
        self.publish();
        Ok(())
    }

    async fn on_mode_change(&mut self) {
        match self.current_mode() {
            SamplingMode::Camera => {
                info!("Switched to camera mode");
                if self.engine.is_loaded() {
                    self.face.is_detecting = true;
                    self.publish();
                } else {
                    self.initialize().await;
                }
            }
            SamplingMode::Manual => {
                info!("Switched to manual mode");
                self.apply_manual();
            }
        }
    }

    fn apply_manual(&mut self) {
        self.face.apply_manual(&self.manual);
        if let Some(tally) = self.tally.as_mut() {
            tally.note_posture(self.face.slouch_detected);
        }
        self.publish();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Calibrate {
                nose_y,
                face_height,
            } => self.engine.calibrate(nose_y, face_height),
            Command::CalibrateToCurrent(reply) => {
                let calibrated = self.engine.calibrate_to_current();
                let _ = reply.send(calibrated);
            }
            Command::ResetState => self.engine.reset_state(),
            Command::Manual(input) => {
                self.manual = input;
                if self.current_mode() == SamplingMode::Manual {
                    self.apply_manual();
                }
            }
            Command::StartSession => {
                if self.tally.is_some() {
                    warn!("Session already running");
                } else {
                    let mut tally = SessionTally::start();
                    tally.note_posture(self.face.slouch_detected);
                    self.tally = Some(tally);
                }
            }
            Command::PauseSession => {
                if let Some(tally) = self.tally.as_mut() {
                    tally.pause();
                }
            }
            Command::ResumeSession => {
                if let Some(tally) = self.tally.as_mut() {
                    tally.resume();
                }
            }
            Command::FinishSession(reply) => {
                let summary = self.tally.take().map(SessionTally::finish);
                let _ = reply.send(summary);
            }
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.face.clone());
    }
}
