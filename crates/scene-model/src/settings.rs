//! Intro, outro, and audio settings.
//!
//! These live next to the scene list but are independent of it: toggling the
//! intro card does not add or remove scenes.

use serde::{Deserialize, Serialize};

/// How title text enters the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAnimation {
    #[default]
    Fade,
    Slide,
    None,
}

/// Title card shown before the first scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub enabled: bool,
    pub title: String,
    pub subtitle: String,
    pub duration_ms: u32,
    pub animation: TextAnimation,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            title: String::new(),
            subtitle: String::new(),
            duration_ms: 2000,
            animation: TextAnimation::Fade,
        }
    }
}

/// Closing card shown after the last scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutroConfig {
    pub enabled: bool,
    pub title: String,
    pub call_to_action: String,
    pub duration_ms: u32,
    pub animation: TextAnimation,
}

impl Default for OutroConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            title: String::new(),
            call_to_action: "Download now".to_string(),
            duration_ms: 2500,
            animation: TextAnimation::Slide,
        }
    }
}

/// Background music bed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,

    /// Locally resolvable audio file reference.
    pub track: Option<String>,

    /// Playback volume in `[0.0, 1.0]`.
    pub volume: f32,

    /// Fade-out applied at the end of the video.
    pub fade_out_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            track: None,
            volume: 0.8,
            fade_out_ms: 1000,
        }
    }
}

/// Clamp a volume into `[0.0, 1.0]`; NaN becomes silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped() {
        assert_eq!(clamp_volume(1.5), 1.0);
        assert_eq!(clamp_volume(-0.2), 0.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
        assert!((clamp_volume(0.3) - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_intro_uses_defaults() {
        let intro: IntroConfig = serde_json::from_str(r#"{ "enabled": true }"#).unwrap();
        assert!(intro.enabled);
        assert_eq!(intro.duration_ms, 2000);
        assert_eq!(intro.animation, TextAnimation::Fade);
    }
}
