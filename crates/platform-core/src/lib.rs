//! MockReel platform core contracts.
//!
//! This crate describes the host capture platform the recording
//! orchestrator talks to, without coupling to a concrete implementation:
//! - a tab-scoped display-media request with resolution/frame-rate hints
//! - an optional crop-target capability that narrows a stream to the stage
//! - a media recorder that reports chunks and its own stop through events

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use mockreel_common::error::MockreelResult;

/// Pixel bounding box of the on-screen stage element.
///
/// Values are in layout pixels and may be fractional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl StageRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rect covers any pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whole-pixel region `(x, y, width, height)`, rounded outward so the
    /// full stage stays inside the crop.
    pub fn to_pixel_region(&self) -> (i32, i32, u32, u32) {
        let left = self.x.floor();
        let top = self.y.floor();
        let right = (self.x + self.width).ceil();
        let bottom = (self.y + self.height).ceil();
        (
            left as i32,
            top as i32,
            (right - left).max(0.0) as u32,
            (bottom - top).max(0.0) as u32,
        )
    }
}

/// Which kind of surface the display-media request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySurface {
    /// A browser tab.
    #[default]
    Browser,
    /// A single application window.
    Window,
    /// A whole monitor.
    Monitor,
}

/// Request for a display capture stream.
///
/// Resolution and frame rate are hints; the platform may downgrade them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMediaRequest {
    pub surface: DisplaySurface,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub ideal_frame_rate: u32,
    pub audio: bool,
    pub prefer_current_tab: bool,
}

impl DisplayMediaRequest {
    /// Video-only request scoped to the current tab.
    pub fn current_tab(ideal_width: u32, ideal_height: u32, ideal_frame_rate: u32) -> Self {
        Self {
            surface: DisplaySurface::Browser,
            ideal_width,
            ideal_height,
            ideal_frame_rate,
            audio: false,
            prefer_current_tab: true,
        }
    }
}

/// Recording container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    WebM,
}

impl ContainerFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::WebM => "video/webm",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
        }
    }

    /// Parse a MIME type, ignoring any codec parameters.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "video/mp4" | "mp4" => Some(Self::Mp4),
            "video/webm" | "webm" => Some(Self::WebM),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Pick the first supported format of `preference`.
///
/// When nothing is reported as supported, the last entry is used anyway and
/// the recorder gets to reject it. Returns `None` only for an empty list.
pub fn select_container(
    preference: &[ContainerFormat],
    is_supported: impl Fn(ContainerFormat) -> bool,
) -> Option<ContainerFormat> {
    preference
        .iter()
        .copied()
        .find(|format| is_supported(*format))
        .or_else(|| preference.last().copied())
}

/// Options handed to the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderOptions {
    pub container: ContainerFormat,
    pub video_bits_per_second: u64,
}

/// Lifecycle state of a media recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Inactive,
    Recording,
    Paused,
}

/// Events a recorder reports back to whoever registered the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A chunk of encoded media. May be empty.
    DataAvailable(Vec<u8>),
    /// The recorder stopped; no more data follows.
    Stopped,
}

/// Channel end a recorder sends its events to.
pub type RecorderSink = UnboundedSender<RecorderEvent>;

/// A live display capture stream.
#[async_trait::async_trait]
pub trait CaptureStream: Send {
    /// Stable identifier for logging.
    fn id(&self) -> &str;

    /// Actual `(width, height, frame_rate)` the platform settled on.
    fn settings(&self) -> (u32, u32, u32);

    /// Whether the video track can be narrowed to a crop target.
    fn supports_crop(&self) -> bool;

    /// Crop the video track to `region`.
    async fn crop_to(&mut self, region: StageRect) -> MockreelResult<()>;

    /// Region the track is cropped to, if any.
    fn cropped_to(&self) -> Option<StageRect>;

    /// Stop every track, releasing the platform's capture indicator.
    fn stop_all_tracks(&mut self);

    /// Whether any track is still live.
    fn is_live(&self) -> bool;
}

/// Records a capture stream into a container.
pub trait MediaRecorder: Send {
    /// Begin recording.
    fn start(&mut self) -> MockreelResult<()>;

    /// Stop recording. Remaining data and [`RecorderEvent::Stopped`] are
    /// delivered through the sink.
    fn stop(&mut self) -> MockreelResult<()>;

    /// Current lifecycle state.
    fn state(&self) -> RecorderState;

    /// Container the recorder writes.
    fn container(&self) -> ContainerFormat;
}

/// The host capture platform.
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Current bounding box of the stage element, if it is on screen.
    fn stage_bounds(&self) -> Option<StageRect>;

    /// Whether crop targets can be created for the stage element.
    fn supports_crop_target(&self) -> bool;

    /// Ask the user/platform for a display capture stream.
    async fn get_display_media(
        &mut self,
        request: &DisplayMediaRequest,
    ) -> MockreelResult<Box<dyn CaptureStream>>;

    /// Whether the recorder can write this container.
    fn is_type_supported(&self, format: ContainerFormat) -> bool;

    /// Create a recorder over `stream` that reports into `sink`.
    fn create_recorder(
        &mut self,
        stream: &dyn CaptureStream,
        options: RecorderOptions,
        sink: RecorderSink,
    ) -> MockreelResult<Box<dyn MediaRecorder>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_container_prefers_first_supported() {
        let prefs = [ContainerFormat::Mp4, ContainerFormat::WebM];
        assert_eq!(
            select_container(&prefs, |_| true),
            Some(ContainerFormat::Mp4)
        );
        assert_eq!(
            select_container(&prefs, |f| f == ContainerFormat::WebM),
            Some(ContainerFormat::WebM)
        );
    }

    #[test]
    fn select_container_falls_back_to_last_entry() {
        let prefs = [ContainerFormat::Mp4, ContainerFormat::WebM];
        assert_eq!(
            select_container(&prefs, |_| false),
            Some(ContainerFormat::WebM)
        );
        assert_eq!(select_container(&[], |_| true), None);
    }

    #[test]
    fn mime_parsing_ignores_codec_parameters() {
        assert_eq!(
            ContainerFormat::from_mime("video/webm;codecs=vp9"),
            Some(ContainerFormat::WebM)
        );
        assert_eq!(
            ContainerFormat::from_mime("VIDEO/MP4"),
            Some(ContainerFormat::Mp4)
        );
        assert_eq!(ContainerFormat::from_mime("video/ogg"), None);
    }

    #[test]
    fn pixel_region_rounds_outward() {
        let rect = StageRect::new(10.4, 20.6, 100.2, 50.0);
        assert_eq!(rect.to_pixel_region(), (10, 20, 101, 51));
        assert!(!rect.is_empty());
        assert!(StageRect::new(0.0, 0.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn container_serializes_lowercase() {
        let json = serde_json::to_string(&ContainerFormat::WebM).unwrap();
        assert_eq!(json, "\"webm\"");
    }
}
