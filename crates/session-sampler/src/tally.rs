//! Per-second session accounting

use crate::FaceState;
use chrono::{DateTime, Utc};
use mood_classifier::Mood;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Score points deducted per posture warning
const POSTURE_WARNING_PENALTY: f64 = 0.5;

/// One sampled second of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetric {
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
    pub is_slouching: bool,
    pub is_distracted: bool,
}

/// Finished session report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Active (unpaused) seconds
    pub total_duration: u64,
    pub focus_time: u64,
    pub distracted_time: u64,
    pub posture_warnings: u32,
    pub mood_history: Vec<SessionMetric>,
    /// 0..=100
    pub final_focus_score: f64,
}

impl SessionSummary {
    /// Occurrences of each mood in the history
    pub fn mood_distribution(&self) -> BTreeMap<Mood, usize> {
        let mut counts = BTreeMap::new();
        for metric in &self.mood_history {
            *counts.entry(metric.mood).or_insert(0) += 1;
        }
        counts
    }
}

/// Focus score: rounded focus percentage minus posture penalties, clamped
pub fn focus_score(focus_time: u64, total_duration: u64, posture_warnings: u32) -> f64 {
    let ratio = if total_duration > 0 {
        focus_time as f64 / total_duration as f64
    } else {
        0.0
    };
    let score = (ratio * 100.0).round() - f64::from(posture_warnings) * POSTURE_WARNING_PENALTY;
    score.clamp(0.0, 100.0)
}

/// Accumulates one session from the display state sampled each second
#[derive(Debug, Clone)]
pub struct SessionTally {
    started_at: DateTime<Utc>,
    /// Start of the current active segment; `None` while paused
    segment_start: Option<Instant>,
    /// Active time from finished segments
    accumulated: Duration,
    focus_time: u64,
    distracted_time: u64,
    posture_warnings: u32,
    last_slouch: bool,
    history: Vec<SessionMetric>,
}

impl SessionTally {
    /// Start a session now
    pub fn start() -> Self {
        info!("Study session started");
        Self {
            started_at: Utc::now(),
            segment_start: Some(Instant::now()),
            accumulated: Duration::ZERO,
            focus_time: 0,
            distracted_time: 0,
            posture_warnings: 0,
            last_slouch: false,
            history: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.segment_start.is_some()
    }

    pub fn pause(&mut self) {
        if let Some(start) = self.segment_start.take() {
            self.accumulated += start.elapsed();
            info!("Study session paused");
        }
    }

    pub fn resume(&mut self) {
        if self.segment_start.is_none() {
            self.segment_start = Some(Instant::now());
            info!("Study session resumed");
        }
    }

    /// Count one second of the session from the current display state.
    /// Ignored while paused.
    pub fn record_second(&mut self, state: &FaceState) {
        if !self.is_active() {
            return;
        }
        if state.is_focused() {
            self.focus_time += 1;
        } else {
            self.distracted_time += 1;
        }
        self.history.push(SessionMetric {
            timestamp: Utc::now(),
            mood: state.mood,
            is_slouching: state.slouch_detected,
            is_distracted: state.distracted,
        });
    }

    /// Track posture changes; each rising edge while active is a warning
    pub fn note_posture(&mut self, slouch_detected: bool) {
        if slouch_detected && !self.last_slouch && self.is_active() {
            self.posture_warnings += 1;
        }
        self.last_slouch = slouch_detected;
    }

    /// Active time so far
    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.segment_start.map_or(Duration::ZERO, |s| s.elapsed())
    }

    pub fn focus_time(&self) -> u64 {
        self.focus_time
    }

    pub fn distracted_time(&self) -> u64 {
        self.distracted_time
    }

    pub fn posture_warnings(&self) -> u32 {
        self.posture_warnings
    }

    pub fn history(&self) -> &[SessionMetric] {
        &self.history
    }

    /// Close the session and compute the summary
    pub fn finish(mut self) -> SessionSummary {
        self.pause();
        let total_duration = self.accumulated.as_secs();
        let final_focus_score = focus_score(self.focus_time, total_duration, self.posture_warnings);

        info!(
            "Study session finished: {}s total, {}s focused, {} posture warnings, score {}",
            total_duration, self.focus_time, self.posture_warnings, final_focus_score
        );

        SessionSummary {
            id: Uuid::new_v4(),
            start_time: self.started_at,
            end_time: Utc::now(),
            total_duration,
            focus_time: self.focus_time,
            distracted_time: self.distracted_time,
            posture_warnings: self.posture_warnings,
            mood_history: self.history,
            final_focus_score,
        }
    }
}
