//! Scene types.
//!
//! A scene is one phone mockup shot: a scrolling stack of screenshots inside
//! a device frame, with a headline and subtitle over a background.

use serde::{Deserialize, Serialize};

use crate::background::DEFAULT_BACKGROUND;

/// Largest accepted scroll speed.
pub const MAX_SCROLL_SPEED: u8 = 100;

/// Opaque unique scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    /// Id of the scene every store starts with.
    pub const DEFAULT: &'static str = "default";

    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SceneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locally resolvable reference to an uploaded screenshot
/// (for example `file:///…/home.png` or `blob:…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Device frame finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhoneColor {
    #[default]
    Black,
    Silver,
    Gold,
    Blue,
}

impl PhoneColor {
    pub const ALL: [PhoneColor; 4] = [
        PhoneColor::Black,
        PhoneColor::Silver,
        PhoneColor::Gold,
        PhoneColor::Blue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Blue => "blue",
        }
    }
}

impl std::str::FromStr for PhoneColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown phone color '{s}'"))
    }
}

/// One scene of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,

    /// Screenshots in scroll order.
    pub screenshots: Vec<ImageRef>,

    pub headline: String,
    pub subtitle: String,

    pub phone_color: PhoneColor,

    /// Background style token (see [`crate::background`]).
    pub background: String,

    /// Scroll speed in `0..=100`.
    pub scroll_speed: u8,
}

impl Scene {
    pub const DEFAULT_HEADLINE: &'static str = "Experience the Future";
    pub const DEFAULT_SUBTITLE: &'static str = "Seamless, elegant, and powerful.";
    pub const NEW_HEADLINE: &'static str = "New Scene";
    pub const NEW_SUBTITLE: &'static str = "Describe this scene...";
    pub const DEFAULT_SCROLL_SPEED: u8 = 20;

    /// The scene a fresh store starts with.
    pub fn initial() -> Self {
        Self {
            id: SceneId::from(SceneId::DEFAULT),
            screenshots: vec![],
            headline: Self::DEFAULT_HEADLINE.to_string(),
            subtitle: Self::DEFAULT_SUBTITLE.to_string(),
            phone_color: PhoneColor::Black,
            background: DEFAULT_BACKGROUND.to_string(),
            scroll_speed: Self::DEFAULT_SCROLL_SPEED,
        }
    }

    /// A new empty scene that keeps `template`'s appearance.
    ///
    /// Copy and screenshots are reset; color, background and scroll speed
    /// carry over.
    pub fn following(template: &Scene) -> Self {
        Self {
            id: SceneId::generate(),
            screenshots: vec![],
            headline: Self::NEW_HEADLINE.to_string(),
            subtitle: Self::NEW_SUBTITLE.to_string(),
            phone_color: template.phone_color,
            background: template.background.clone(),
            scroll_speed: template.scroll_speed,
        }
    }
}

/// Clamp a requested scroll speed into `0..=100`.
pub fn clamp_scroll_speed(speed: i64) -> u8 {
    speed.clamp(0, MAX_SCROLL_SPEED as i64) as u8
}

/// Frozen stage size in layout pixels, held while a capture is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Output framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    /// 1:1 square.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 9:16 vertical (social media).
    #[serde(rename = "9:16")]
    Vertical,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Vertical => "9:16",
        }
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        match self {
            Self::Square => 1.0,
            Self::Vertical => 9.0 / 16.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_scene_uses_default_id_and_copy() {
        let scene = Scene::initial();
        assert_eq!(scene.id.as_str(), "default");
        assert_eq!(scene.headline, "Experience the Future");
        assert_eq!(scene.scroll_speed, 20);
        assert!(scene.screenshots.is_empty());
    }

    #[test]
    fn following_scene_keeps_appearance_and_resets_content() {
        let mut template = Scene::initial();
        template.phone_color = PhoneColor::Gold;
        template.scroll_speed = 75;
        template.screenshots.push(ImageRef::new("file:///a.png"));

        let next = Scene::following(&template);
        assert_ne!(next.id, template.id);
        assert_eq!(next.phone_color, PhoneColor::Gold);
        assert_eq!(next.scroll_speed, 75);
        assert_eq!(next.background, template.background);
        assert_eq!(next.headline, "New Scene");
        assert_eq!(next.subtitle, "Describe this scene...");
        assert!(next.screenshots.is_empty());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(SceneId::generate(), SceneId::generate());
    }

    #[test]
    fn phone_color_parses_case_insensitively() {
        assert_eq!("GOLD".parse::<PhoneColor>(), Ok(PhoneColor::Gold));
        assert!("red".parse::<PhoneColor>().is_err());
    }

    #[test]
    fn scroll_speed_clamps() {
        assert_eq!(clamp_scroll_speed(-5), 0);
        assert_eq!(clamp_scroll_speed(42), 42);
        assert_eq!(clamp_scroll_speed(400), 100);
    }

    #[test]
    fn aspect_ratio_serializes_as_ratio_string() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Vertical).unwrap(),
            "\"9:16\""
        );
        let parsed: AspectRatio = serde_json::from_str("\"1:1\"").unwrap();
        assert_eq!(parsed, AspectRatio::Square);
    }
}
