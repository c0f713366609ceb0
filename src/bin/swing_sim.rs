//! `swing-sim`: run a coaching session against synthetic pose frames.
//!
//! Frames from a named swing profile are fed to the orchestrator in real time
//! and coaching cues are "spoken" by the simulated voice (see the log output).
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin swing-sim -- --profile clean_forehand --reps 3
//! cargo run --bin swing-sim -- --profile noisy_forehand --player Alex --json
//! cargo run --bin swing-sim -- --list-profiles
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use swing_core::analysis::SwingType;
use swing_core::coaching::{SimulatedVoice, SpeechSink};
use swing_core::config::{CoachConfig, ConfigLoader, SessionConfig};
use swing_core::session::{FrameSubmission, SessionOrchestrator, SessionReport};
use swing_core::simulation::{FrameSimulator, SwingProfile};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "swing-sim",
    version,
    about = "Simulated swing coaching session",
    long_about = None,
)]
struct Args {
    /// TOML configuration file (defaults and SWING_* overrides otherwise)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Swing profile to simulate
    #[arg(long, short = 'p', default_value = "clean_forehand")]
    profile: String,

    /// Repetitions to generate
    #[arg(long, short = 'r', default_value_t = 3)]
    reps: usize,

    #[arg(long, default_value = "Player")]
    player: String,

    /// Target repetitions announced by the coach (0 disables progress cues)
    #[arg(long, default_value_t = 10)]
    target: u32,

    /// Frame rate of the simulated camera
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Seconds to keep the session open after the last frame so queued cues drain
    #[arg(long, default_value_t = 4.0)]
    drain_secs: f64,

    /// Print the session report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// List the available profiles and exit
    #[arg(long, default_value_t = false)]
    list_profiles: bool,
}

fn load_config(args: &Args, profile: &SwingProfile) -> Result<CoachConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConfigLoader::new().load().context("loading configuration")?,
    };

    // The simulated player decides handedness
    config.analyzer.handedness = profile.handedness;
    if profile.swing_type == SwingType::Backhand {
        config.analyzer.enable_swing_type_classification = true;
    }
    Ok(config)
}

fn print_report(report: &SessionReport) {
    println!("Session for {}", report.player_name);
    println!(
        "  swings: {} (target {}){}",
        report.swing_count(),
        report.target_reps,
        if report.target_reached() { ", target reached" } else { "" }
    );
    for swing in &report.swings {
        println!(
            "  #{:<3} {:?}  {:5.1} mph  score {:3}  {:.2}s",
            swing.index, swing.swing_type, swing.estimated_speed_mph, swing.form_score, swing.duration_secs
        );
    }
    if let Some(best) = report.best_score {
        println!("  average speed {:.1} mph, best score {}", report.average_speed_mph, best);
    }
    if report.swings_abandoned > 0 {
        println!("  {} swings abandoned", report.swings_abandoned);
    }
    println!(
        "  frames: {} submitted, {} dropped, {} rejected",
        report.frames_submitted, report.frames_dropped, report.frames_rejected
    );
    println!(
        "  messages: {} sent, {} duplicates, {} stale, {} failed",
        report.scheduler.sent, report.scheduler.duplicates, report.scheduler.stale, report.scheduler.send_failures
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swing_core=info,swing_sim=info")),
        )
        .with_target(false)
        .init();

    if args.list_profiles {
        for profile in SwingProfile::all() {
            println!("{:<22} {}", profile.name, profile.description);
        }
        return Ok(());
    }

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive");
    }

    let Some(profile) = SwingProfile::by_name(&args.profile) else {
        bail!(
            "unknown profile '{}', expected one of: {}",
            args.profile,
            SwingProfile::names().join(", ")
        );
    };

    let config = load_config(&args, &profile)?;
    let voice: Arc<dyn SpeechSink> = Arc::new(SimulatedVoice::new());
    let mut orchestrator = SessionOrchestrator::new(config, voice)?;
    orchestrator.start(SessionConfig::new(args.player.clone(), args.target))?;

    let mut simulator = FrameSimulator::new(profile, args.fps);
    let frames = simulator.session(args.reps);
    info!(
        profile = %simulator.profile().name,
        frames = frames.len(),
        fps = args.fps,
        "Streaming simulated frames"
    );

    let mut pacing = interval(Duration::from_secs_f64(simulator.frame_interval_secs()));
    pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
    for frame in frames {
        pacing.tick().await;
        if orchestrator.submit_frame(frame) == FrameSubmission::Inactive {
            bail!("session stopped unexpectedly");
        }
    }

    tokio::time::sleep(Duration::from_secs_f64(args.drain_secs.max(0.0))).await;
    let report = orchestrator.end_session().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
