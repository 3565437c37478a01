//! Building a store from a storyboard.
//!
//! The storyboard is replayed through the public actions only, so the
//! resulting store obeys the same invariants as one edited by hand.

use std::path::Path;

use mockreel_common::error::{MockreelError, MockreelResult};
use mockreel_scene_model::{resolve_background, SceneTarget, Storyboard, StoryboardError};

use crate::ingest::ingest_images;
use crate::store::SceneStore;

impl SceneStore {
    /// Replay `storyboard` into a fresh store. Screenshot paths are resolved
    /// against `base_dir`; missing files are skipped with a warning.
    pub fn from_storyboard(storyboard: &Storyboard, base_dir: &Path) -> Self {
        let mut store = SceneStore::new();

        for (idx, entry) in storyboard.scenes.iter().enumerate() {
            if idx > 0 {
                store.add_scene();
            }
            let images = ingest_images(entry.screenshots.iter().map(|p| base_dir.join(p)));
            if images.len() < entry.screenshots.len() {
                tracing::warn!(
                    scene = idx + 1,
                    expected = entry.screenshots.len(),
                    loaded = images.len(),
                    "Some screenshots could not be loaded"
                );
            }
            if !images.is_empty() {
                store.add_screenshots(images);
            }
            if let Some(headline) = &entry.headline {
                store.update_headline(headline.clone());
            }
            if let Some(subtitle) = &entry.subtitle {
                store.update_subtitle(subtitle.clone());
            }
            if let Some(color) = entry.phone_color {
                store.set_phone_color(color);
            }
            if let Some(background) = &entry.background {
                store.set_background(resolve_background(background));
            }
            if let Some(speed) = entry.scroll_speed {
                store.set_scroll_speed(i64::from(speed));
            }
        }

        store.set_aspect_ratio(storyboard.aspect_ratio);
        store.set_intro(storyboard.intro.clone());
        store.set_outro(storyboard.outro.clone());
        store.set_audio(storyboard.audio.clone());
        let first = store.scenes()[0].id.clone();
        store.set_active_scene(SceneTarget::Scene(first));

        tracing::info!(
            name = %storyboard.name,
            scenes = store.scenes().len(),
            "Storyboard loaded into store"
        );
        store
    }
}

/// Load a storyboard file and build a store from it.
pub fn load_storyboard(path: &Path) -> MockreelResult<(Storyboard, SceneStore)> {
    let storyboard = Storyboard::load(path).map_err(|e| match e {
        StoryboardError::IoError { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            MockreelError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
        other => MockreelError::scene(other.to_string()),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let store = SceneStore::from_storyboard(&storyboard, base_dir);
    Ok((storyboard, store))
}
