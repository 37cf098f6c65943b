//! Study Session Monitor - Main Entry Point

use clap::Parser;
use mood_monitor::{init_logging, resolve_config, run_replay, ReplayOptions};
use std::path::PathBuf;
use tracing::info;

/// Infer mood, posture, and attention from recorded face detector output
#[derive(Parser)]
#[command(name = "mood-monitor")]
#[command(version)]
#[command(about = "Replay detector output as a study session", long_about = None)]
struct Cli {
    /// JSON-lines replay script (one detector response per line)
    script: PathBuf,

    /// Engine configuration file (TOML or JSON); MOOD_* env vars override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in preset used when no config file is given (strict, lenient)
    #[arg(long)]
    preset: Option<String>,

    /// Override the detection interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Recalibrate posture after this many state updates
    #[arg(long)]
    calibrate_after: Option<u32>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    info!("=== Study Session Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = resolve_config(cli.config.as_deref(), cli.preset.as_deref())?;
    if let Some(interval_ms) = cli.interval_ms {
        config.sample_interval_ms = interval_ms;
        config.validate()?;
    }

    let options = ReplayOptions {
        engine: config,
        calibrate_after: cli.calibrate_after,
    };
    let mut stdout = std::io::stdout().lock();
    let summary = run_replay(&cli.script, options, &mut stdout).await?;

    info!(
        "Session {} done: focus score {} over {}s",
        summary.id, summary.final_focus_score, summary.total_duration
    );
    Ok(())
}
