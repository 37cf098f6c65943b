//! Study Session Monitor
//!
//! Replays recorded detector output through the sampler at the configured
//! cadence, streaming display-state updates and a final session summary.

use anyhow::Context;
use face_signals::ReplayDetector;
use mood_engine::{EngineConfig, MoodEngine};
use serde::Serialize;
use session_sampler::{DetectionSampler, FaceState, SamplerConfig, SessionSummary};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr; stdout carries the JSON output
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Pick the engine configuration: a file (layered with env overrides) or a preset
pub fn resolve_config(path: Option<&Path>, preset: Option<&str>) -> anyhow::Result<EngineConfig> {
    let config = match (path, preset) {
        (Some(path), _) => EngineConfig::load(Some(path))?,
        (None, Some("strict")) => EngineConfig::strict(),
        (None, Some("lenient")) => EngineConfig::lenient(),
        (None, Some(other)) => anyhow::bail!("Unknown preset: {}", other),
        (None, None) => EngineConfig::load(None)?,
    };
    config.validate()?;
    Ok(config)
}

/// One line of monitor output
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent<'a> {
    State(&'a FaceState),
    Summary(&'a SessionSummary),
}

fn emit(out: &mut impl Write, event: &MonitorEvent<'_>) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    writeln!(out)?;
    Ok(())
}

/// Options for one replay run
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub engine: EngineConfig,
    /// Recalibrate posture after this many state updates
    pub calibrate_after: Option<u32>,
}

/// Replay a recorded script as a study session, writing JSON lines to `out`
pub async fn run_replay(
    script: &Path,
    options: ReplayOptions,
    out: &mut impl Write,
) -> anyhow::Result<SessionSummary> {
    let detector = ReplayDetector::from_path(script)
        .with_context(|| format!("Failed to read replay script {}", script.display()))?;
    let frames = detector.remaining();
    let interval_ms = options.engine.sample_interval_ms;
    info!("Replaying {} frames at {} ms", frames, interval_ms);

    let sampler_config = SamplerConfig {
        detect_interval_ms: interval_ms,
        ..Default::default()
    };
    let engine = MoodEngine::new(detector, options.engine);
    let (sampler, handle) = DetectionSampler::new(engine, sampler_config);
    let mut updates = handle.subscribe();
    let task = tokio::spawn(sampler.run(|| Some(())));

    handle.start_session().await?;

    let total = Duration::from_millis(interval_ms.saturating_mul(frames as u64 + 1));
    let deadline = tokio::time::sleep(total);
    tokio::pin!(deadline);
    let mut ticks = 0u32;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, finishing session early");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                emit(out, &MonitorEvent::State(&state))?;

                ticks += 1;
                if options.calibrate_after == Some(ticks) {
                    let calibrated = handle.calibrate_to_current().await?;
                    info!("Posture recalibration after {} updates: {}", ticks, calibrated);
                }
            }
        }
    }

    let summary = handle
        .finish_session()
        .await?
        .context("Session was not running")?;
    emit(out, &MonitorEvent::Summary(&summary))?;

    handle.shutdown();
    task.await??;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_presets() {
        let strict = resolve_config(None, Some("strict")).unwrap();
        assert_eq!(strict, EngineConfig::strict());
        assert!(resolve_config(None, Some("sloppy")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_session() {
        let path = std::env::temp_dir().join(format!("mood-monitor-{}.jsonl", std::process::id()));
        std::fs::write(&path, "{\"kind\":\"no_face\"}\n{\"kind\":\"no_face\"}\n{\"kind\":\"no_face\"}\n").unwrap();

        let options = ReplayOptions {
            engine: EngineConfig::default(),
            calibrate_after: None,
        };
        let mut out = Vec::new();
        let summary = run_replay(&path, options, &mut out).await.unwrap();
        std::fs::remove_file(&path).ok();

        // Nobody in frame the whole time
        assert_eq!(summary.focus_time, 0);
        assert_eq!(summary.final_focus_score, 0.0);

        let text = String::from_utf8(out).unwrap();
        let last = text.lines().last().unwrap();
        let value: serde_json::Value = serde_json::from_str(last).unwrap();
        assert_eq!(value["type"], "summary");
        assert!(text.lines().any(|l| l.contains("\"distracted\":true")));
    }
}
