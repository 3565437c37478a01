//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where finished videos are written.
    pub output_dir: PathBuf,

    /// Capture request and recorder parameters.
    pub capture: CaptureDefaults,

    /// Delays used by the scene sequence engine.
    pub timings: SequenceTimings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Display capture hints and recorder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Ideal capture width; the platform may downgrade it.
    pub ideal_width: u32,

    /// Ideal capture height.
    pub ideal_height: u32,

    /// Ideal capture frame rate.
    pub ideal_frame_rate: u32,

    /// Constant target bitrate handed to the recorder.
    pub video_bits_per_second: u64,

    /// Container MIME types in order of preference.
    pub container_preference: Vec<String>,

    /// Filename offered when the artifact is downloaded.
    pub suggested_filename: String,
}

/// Fixed delays of the recording sequence, in milliseconds.
///
/// These must exceed the rendering layer's own transition durations so
/// that no captured frame shows a half-finished scene change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTimings {
    /// Delay between recorder start and the first play.
    pub start_delay_ms: u64,

    /// Delay between pausing a finished scene and switching to the next.
    pub settle_ms: u64,

    /// Time reserved for the exit/enter transition after a scene switch.
    pub transition_ms: u64,

    /// Delay between the reset signal and resuming playback.
    pub resume_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "mockreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            ideal_width: 3840,
            ideal_height: 2160,
            ideal_frame_rate: 60,
            video_bits_per_second: 25_000_000,
            container_preference: vec!["video/mp4".to_string(), "video/webm".to_string()],
            suggested_filename: "app-promo.mp4".to_string(),
        }
    }
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            start_delay_ms: 1000,
            settle_ms: 300,
            transition_ms: 500,
            resume_delay_ms: 100,
        }
    }
}

impl SequenceTimings {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    /// Total dead time inserted between two consecutive scenes.
    pub fn scene_gap(&self) -> Duration {
        self.settle() + self.transition() + self.resume_delay()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("mockreel").join("config.json")
}
