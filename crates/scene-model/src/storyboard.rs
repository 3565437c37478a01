//! Storyboard files.
//!
//! A storyboard is a JSON description of a whole promo video: the scenes in
//! order and the global settings. It is input for headless recording runs;
//! the store itself is never written back to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scene::{AspectRatio, PhoneColor, MAX_SCROLL_SPEED};
use crate::settings::{AudioConfig, IntroConfig, OutroConfig};

/// Top-level storyboard document (`storyboard.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    /// Human-readable video name.
    pub name: String,

    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    #[serde(default)]
    pub intro: IntroConfig,

    #[serde(default)]
    pub outro: OutroConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    /// Scenes in playback order. Must not be empty.
    pub scenes: Vec<StoryboardScene>,
}

/// One scene entry. Missing fields keep whatever the store would use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryboardScene {
    /// Screenshot files, relative to the storyboard's directory.
    pub screenshots: Vec<PathBuf>,
    pub headline: Option<String>,
    pub subtitle: Option<String>,
    pub phone_color: Option<PhoneColor>,

    /// Preset name (e.g. "Forest") or raw background token.
    pub background: Option<String>,
    pub scroll_speed: Option<u8>,
}

/// Errors that can occur when working with storyboards.
#[derive(Debug, thiserror::Error)]
pub enum StoryboardError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid storyboard: {message}")]
    ValidationError { message: String },
}

impl Storyboard {
    /// Load and validate a storyboard file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoryboardError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| StoryboardError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let storyboard: Storyboard =
            serde_json::from_str(&json).map_err(|e| StoryboardError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        storyboard.validate()?;
        Ok(storyboard)
    }

    /// Write the storyboard as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoryboardError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoryboardError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| StoryboardError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| StoryboardError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Structural checks that serde cannot express.
    pub fn validate(&self) -> Result<(), StoryboardError> {
        if self.scenes.is_empty() {
            return Err(StoryboardError::ValidationError {
                message: "storyboard must contain at least one scene".to_string(),
            });
        }
        for (idx, scene) in self.scenes.iter().enumerate() {
            if let Some(speed) = scene.scroll_speed {
                if speed > MAX_SCROLL_SPEED {
                    return Err(StoryboardError::ValidationError {
                        message: format!(
                            "scene {} scroll_speed {speed} exceeds {MAX_SCROLL_SPEED}",
                            idx + 1
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Screenshot paths that do not exist, resolved against `base_dir`.
    pub fn missing_screenshots(&self, base_dir: &Path) -> Vec<String> {
        let mut missing = vec![];
        for (idx, scene) in self.scenes.iter().enumerate() {
            for shot in &scene.screenshots {
                if !base_dir.join(shot).exists() {
                    missing.push(format!("Scene {} screenshot missing: {}", idx + 1, shot.display()));
                }
            }
        }
        missing
    }

    /// A two-scene starter storyboard.
    pub fn sample(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aspect_ratio: AspectRatio::Vertical,
            intro: IntroConfig::default(),
            outro: OutroConfig::default(),
            audio: AudioConfig::default(),
            scenes: vec![
                StoryboardScene {
                    screenshots: vec![PathBuf::from("screens/home.png")],
                    headline: Some("Experience the Future".to_string()),
                    subtitle: Some("Seamless, elegant, and powerful.".to_string()),
                    phone_color: Some(PhoneColor::Black),
                    background: Some("Noir Elegance".to_string()),
                    scroll_speed: Some(20),
                },
                StoryboardScene {
                    screenshots: vec![PathBuf::from("screens/detail.png")],
                    headline: Some("Everything in one place".to_string()),
                    subtitle: None,
                    phone_color: Some(PhoneColor::Gold),
                    background: Some("Luxury Gold".to_string()),
                    scroll_speed: Some(35),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_round_trips_through_disk() {
        let dir = std::env::temp_dir().join("mockreel_test_storyboard");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("storyboard.json");

        Storyboard::sample("Launch").save(&path).unwrap();
        let loaded = Storyboard::load(&path).unwrap();
        assert_eq!(loaded.name, "Launch");
        assert_eq!(loaded.scenes.len(), 2);
        assert_eq!(loaded.aspect_ratio, AspectRatio::Vertical);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_scene_list_is_rejected() {
        let mut storyboard = Storyboard::sample("Empty");
        storyboard.scenes.clear();
        let err = storyboard.validate().unwrap_err();
        assert!(err.to_string().contains("at least one scene"));
    }

    #[test]
    fn out_of_range_scroll_speed_is_rejected() {
        let mut storyboard = Storyboard::sample("Fast");
        storyboard.scenes[1].scroll_speed = Some(150);
        assert!(storyboard.validate().is_err());
    }

    #[test]
    fn missing_screenshots_are_reported() {
        let storyboard = Storyboard::sample("Missing");
        let missing = storyboard.missing_screenshots(Path::new("/nonexistent-mockreel"));
        assert_eq!(missing.len(), 2);
        assert!(missing[0].contains("Scene 1 screenshot missing"));
    }

    #[test]
    fn minimal_document_parses_with_defaults() {
        let parsed: Storyboard =
            serde_json::from_str(r#"{ "name": "Tiny", "scenes": [ {} ] }"#).unwrap();
        assert_eq!(parsed.aspect_ratio, AspectRatio::Square);
        assert!(!parsed.intro.enabled);
        assert_eq!(parsed.scenes[0], StoryboardScene::default());
    }
}
