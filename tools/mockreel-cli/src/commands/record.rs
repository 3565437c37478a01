//! Record a full pass over every scene of a storyboard.

use std::path::PathBuf;

use mockreel_capture_engine::{
    drive, get_backend, BackendKind, DriveOptions, Pace, RecordingSession, SessionConfig,
    TimedStage,
};
use mockreel_common::config::AppConfig;
use mockreel_scene_store::load_storyboard;

use super::{default_stage, parse_stage};

pub struct RecordArgs {
    pub storyboard: PathBuf,
    pub output: Option<PathBuf>,
    pub backend: String,
    pub stage: Option<String>,
    pub realtime: bool,
    pub no_crop: bool,
    pub formats: Vec<String>,
}

pub async fn run(config: &AppConfig, args: RecordArgs) -> anyhow::Result<()> {
    let (storyboard, store) = load_storyboard(&args.storyboard)?;
    let base_dir = args
        .storyboard
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    for missing in storyboard.missing_screenshots(&base_dir) {
        println!("[WARN] {missing}");
    }

    let kind: BackendKind = args.backend.parse()?;
    let stage_rect = match &args.stage {
        Some(value) => parse_stage(value)?,
        None => default_stage(storyboard.aspect_ratio),
    };
    let backend = get_backend(kind, Some(stage_rect))?;

    let mut session_config = SessionConfig::from(config);
    session_config.crop_to_stage = !args.no_crop;
    if !args.formats.is_empty() {
        session_config.capture.container_preference = args.formats.clone();
    }

    // Real capture films the screen, so it can only run in wall-clock time.
    let pace = if args.realtime || kind != BackendKind::Simulated {
        Pace::RealTime
    } else {
        Pace::Instant
    };

    println!("Recording '{}'", storyboard.name);
    println!("  Scenes: {}", store.scenes().len());
    println!("  Aspect: {}", storyboard.aspect_ratio.as_str());
    println!("  Backend: {}", backend.name());
    println!(
        "  Stage: {}x{} at ({}, {})",
        stage_rect.width, stage_rect.height, stage_rect.x, stage_rect.y
    );
    if pace == Pace::RealTime {
        println!("Press Ctrl+C to stop early...");
    }
    println!();

    let mut stage = TimedStage::for_scenes(store.scenes());
    let mut session = RecordingSession::new(store, backend, session_config);
    let options = DriveOptions {
        pace,
        ..DriveOptions::default()
    };

    let report = tokio::select! {
        report = drive(&mut session, &mut stage, options) => Some(report?),
        _ = tokio::signal::ctrl_c() => None,
    };

    let (artifact, timed_out) = match report {
        Some(report) => (report.artifact, report.timed_out),
        None => {
            tracing::warn!("Interrupted by Ctrl+C");
            println!("Interrupted, stopping recording");
            session.stop_region_recording();
            session.wait_finalized().await;
            (session.take_artifact(), false)
        }
    };

    if timed_out {
        println!("[WARN] Recording hit the time limit before the last scene finished");
    }

    let Some(artifact) = artifact else {
        anyhow::bail!("Recording produced no video");
    };
    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
    let path = artifact.save_to(&output_dir)?;
    tracing::info!(path = %path.display(), bytes = artifact.len(), "Recording saved");

    println!("Recording saved to: {}", path.display());
    println!("  Format: {}", artifact.mime_type());
    println!("  Size: {} bytes", artifact.len());
    println!("  Duration: {:.1}s", artifact.duration.as_secs_f64());
    Ok(())
}
