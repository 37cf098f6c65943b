//! Engine configuration

use crate::EngineError;
use feature_engine::HeuristicsConfig;
use mood_classifier::MoodThresholds;
use posture::PostureConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable prefix for overrides, e.g.
/// `MOOD_HEURISTICS__BLINK_WINDOW_MS=20000`
pub const ENV_PREFIX: &str = "MOOD";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blink, gaze, and geometry settings
    pub heuristics: HeuristicsConfig,

    /// Slouch detection settings
    pub posture: PostureConfig,

    /// Mood rule cascade cut-offs
    pub thresholds: MoodThresholds,

    /// Recommended detection sampling interval (milliseconds)
    pub sample_interval_ms: u64,

    /// Upper bound on detector initialization (milliseconds)
    pub load_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heuristics: HeuristicsConfig::default(),
            posture: PostureConfig::default(),
            thresholds: MoodThresholds::default(),
            sample_interval_ms: 500,
            load_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Create strict config (flags posture and wandering gaze sooner)
    pub fn strict() -> Self {
        Self {
            posture: PostureConfig {
                slouch_coefficient: 0.2,
            },
            thresholds: MoodThresholds {
                bored_gaze: 0.25,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create lenient config (tolerates more movement)
    pub fn lenient() -> Self {
        Self {
            posture: PostureConfig {
                slouch_coefficient: 0.35,
            },
            thresholds: MoodThresholds {
                bored_gaze: 0.4,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Layer defaults, an optional config file, and `MOOD_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            info!("Loading engine configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EngineError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values that would make the rolling state meaningless
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.heuristics.blink_window_ms == 0 {
            return Err(EngineError::Config("blink_window_ms must be > 0".into()));
        }
        if self.heuristics.gaze_capacity == 0 {
            return Err(EngineError::Config("gaze_capacity must be > 0".into()));
        }
        if self.sample_interval_ms == 0 {
            return Err(EngineError::Config("sample_interval_ms must be > 0".into()));
        }
        let coefficient = self.posture.slouch_coefficient;
        if coefficient.is_nan() || coefficient < 0.0 {
            return Err(EngineError::Config(
                "slouch_coefficient must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
