//! Write a sample storyboard.

use std::path::PathBuf;

use mockreel_scene_model::Storyboard;

pub fn run(path: PathBuf, name: String, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let storyboard = Storyboard::sample(&name);
    storyboard.save(&path)?;

    println!("Storyboard '{}' written to {}", name, path.display());
    println!("  Scenes: {}", storyboard.scenes.len());
    println!("  Aspect: {}", storyboard.aspect_ratio.as_str());
    println!();
    println!("Next steps:");
    println!("  1. Add screenshot paths to each scene (relative to the storyboard)");
    println!("  2. mockreel plan {}", path.display());
    println!("  3. mockreel record {}", path.display());
    Ok(())
}
