//! Print the timeline of a recording pass without capturing anything.

use std::path::PathBuf;

use serde::Serialize;

use mockreel_capture_engine::{
    drive, pass_duration, BackendKind, DriveOptions, Pace, RecordingSession, SessionConfig,
    TimedStage, TimelineEntry, TimelineEvent,
};
use mockreel_common::config::AppConfig;
use mockreel_scene_store::load_storyboard;

use super::default_stage;

#[derive(Serialize)]
struct Plan<'a> {
    name: &'a str,
    scene_durations_ms: Vec<u64>,
    total_ms: u64,
    timeline: &'a [TimelineEntry],
}

pub async fn run(config: &AppConfig, storyboard_path: PathBuf, json: bool) -> anyhow::Result<()> {
    let (storyboard, store) = load_storyboard(&storyboard_path)?;
    let headlines: Vec<String> = store.scenes().iter().map(|s| s.headline.clone()).collect();
    let durations: Vec<u64> = store
        .scenes()
        .iter()
        .map(|s| pass_duration(s).as_millis() as u64)
        .collect();

    let backend = mockreel_capture_engine::get_backend(
        BackendKind::Simulated,
        Some(default_stage(storyboard.aspect_ratio)),
    )?;
    let mut stage = TimedStage::for_scenes(store.scenes());
    let mut session = RecordingSession::new(store, backend, SessionConfig::from(config));
    let options = DriveOptions {
        pace: Pace::Instant,
        ..DriveOptions::default()
    };
    let report = drive(&mut session, &mut stage, options).await?;
    let total_ms = report
        .artifact
        .as_ref()
        .map(|a| a.duration.as_millis() as u64)
        .unwrap_or_default();

    if json {
        let plan = Plan {
            name: &storyboard.name,
            scene_durations_ms: durations,
            total_ms,
            timeline: &report.timeline,
        };
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Timeline for '{}'", storyboard.name);
    println!("{}", "=".repeat(50));
    for entry in &report.timeline {
        let at = entry.at.as_secs_f64();
        match entry.event {
            TimelineEvent::SceneActivated { scene } => println!(
                "{at:>8.3}s  scene {} shown: {}",
                scene + 1,
                headlines.get(scene).map(String::as_str).unwrap_or("")
            ),
            TimelineEvent::PlaybackStarted { scene } => {
                println!("{at:>8.3}s  scene {} playing", scene + 1)
            }
            TimelineEvent::PlaybackPaused { scene } => {
                println!("{at:>8.3}s  scene {} paused", scene + 1)
            }
            TimelineEvent::SceneReset { scene } => {
                println!("{at:>8.3}s  scene {} reset", scene + 1)
            }
            TimelineEvent::RecordingStopped => println!("{at:>8.3}s  recording stopped"),
        }
    }
    println!();
    println!("Total length: {:.1}s", total_ms as f64 / 1000.0);
    Ok(())
}
