//! Show the scenes of a storyboard.

use std::path::PathBuf;

use mockreel_scene_model::preset_name;
use mockreel_scene_store::load_storyboard;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let (storyboard, store) = load_storyboard(&path)?;
    let state = store.state();

    println!("Storyboard: {}", storyboard.name);
    println!("{}", "=".repeat(50));
    println!("Aspect ratio: {}", state.aspect_ratio.as_str());
    println!("Scenes: {}", state.scenes.len());
    for (idx, scene) in state.scenes.iter().enumerate() {
        println!();
        println!("  Scene {}: {}", idx + 1, scene.headline);
        println!("    Subtitle: {}", scene.subtitle);
        println!("    Phone: {}", scene.phone_color.as_str());
        println!(
            "    Background: {}",
            preset_name(&scene.background).unwrap_or("custom")
        );
        println!("    Scroll speed: {}", scene.scroll_speed);
        println!("    Screenshots: {}", scene.screenshots.len());
    }

    println!();
    let intro = &state.intro;
    if intro.enabled {
        println!("Intro: \"{}\" ({} ms)", intro.title, intro.duration_ms);
    } else {
        println!("Intro: off");
    }
    let outro = &state.outro;
    if outro.enabled {
        println!(
            "Outro: \"{}\" / \"{}\" ({} ms)",
            outro.title, outro.call_to_action, outro.duration_ms
        );
    } else {
        println!("Outro: off");
    }
    let audio = &state.audio;
    match (&audio.track, audio.enabled) {
        (Some(track), true) => println!("Audio: {} at {:.0}%", track, audio.volume * 100.0),
        _ => println!("Audio: off"),
    }

    let base_dir = path.parent().map(PathBuf::from).unwrap_or_default();
    let missing = storyboard.missing_screenshots(&base_dir);
    if !missing.is_empty() {
        println!();
        for line in &missing {
            println!("[WARN] {line}");
        }
    }
    Ok(())
}
