//! Headless capture backend.
//!
//! Behaves like a permissive browser tab: it grants a stream at the hinted
//! resolution, can crop to a configured stage, and its recorder produces a
//! small synthetic payload when stopped. Every interaction is written to a
//! shared [`SimulatedProbe`] so callers can inspect what happened.

use std::sync::{Arc, Mutex};

use mockreel_common::error::{MockreelError, MockreelResult};
use mockreel_platform_core::{
    CaptureBackend, CaptureStream, ContainerFormat, DisplayMediaRequest, MediaRecorder,
    RecorderEvent, RecorderOptions, RecorderSink, RecorderState, StageRect,
};

/// What the simulated platform offers.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedConfig {
    /// Bounds of the stage element, if one is on screen.
    pub stage: Option<StageRect>,
    /// Whether region crop targets exist at all.
    pub crop_target_supported: bool,
    /// Containers the recorder accepts.
    pub supported_containers: Vec<ContainerFormat>,
    /// Refuse the display-media request.
    pub deny_permission: bool,
    /// Reject the crop call even though crop is reported as supported.
    pub fail_crop: bool,
    /// Fail when the recorder is started.
    pub fail_recorder_start: bool,
    /// Highest resolution and frame rate the platform will grant.
    pub max_settings: (u32, u32, u32),
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            stage: Some(StageRect::new(0.0, 0.0, 1080.0, 1080.0)),
            crop_target_supported: true,
            supported_containers: vec![ContainerFormat::Mp4, ContainerFormat::WebM],
            deny_permission: false,
            fail_crop: false,
            fail_recorder_start: false,
            max_settings: (3840, 2160, 60),
        }
    }
}

/// Record of what the backend was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedProbe {
    pub requests: Vec<DisplayMediaRequest>,
    pub cropped_to: Option<StageRect>,
    pub recorder_options: Option<RecorderOptions>,
    pub recorder_starts: usize,
    pub recorder_stops: usize,
    pub tracks_stopped: usize,
}

type SharedProbe = Arc<Mutex<SimulatedProbe>>;

fn with_probe(probe: &SharedProbe, f: impl FnOnce(&mut SimulatedProbe)) {
    let mut guard = probe.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard);
}

pub struct SimulatedBackend {
    config: SimulatedConfig,
    probe: SharedProbe,
    streams: u32,
}

impl SimulatedBackend {
    pub fn new(config: SimulatedConfig) -> Self {
        Self {
            config,
            probe: SharedProbe::default(),
            streams: 0,
        }
    }

    pub fn config(&self) -> &SimulatedConfig {
        &self.config
    }

    /// Handle to the interaction record. Stays valid after the backend is
    /// moved into a session.
    pub fn probe(&self) -> Arc<Mutex<SimulatedProbe>> {
        Arc::clone(&self.probe)
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn stage_bounds(&self) -> Option<StageRect> {
        self.config.stage
    }

    fn supports_crop_target(&self) -> bool {
        self.config.crop_target_supported
    }

    async fn get_display_media(
        &mut self,
        request: &DisplayMediaRequest,
    ) -> MockreelResult<Box<dyn CaptureStream>> {
        with_probe(&self.probe, |p| p.requests.push(request.clone()));
        if self.config.deny_permission {
            return Err(MockreelError::permission_denied(
                "Display capture was not allowed",
            ));
        }

        self.streams += 1;
        let (max_w, max_h, max_fps) = self.config.max_settings;
        Ok(Box::new(SimulatedStream {
            id: format!("simulated-stream-{}", self.streams),
            settings: (
                request.ideal_width.min(max_w),
                request.ideal_height.min(max_h),
                request.ideal_frame_rate.min(max_fps),
            ),
            crop_supported: self.config.crop_target_supported,
            fail_crop: self.config.fail_crop,
            cropped_to: None,
            live: true,
            probe: Arc::clone(&self.probe),
        }))
    }

    fn is_type_supported(&self, format: ContainerFormat) -> bool {
        self.config.supported_containers.contains(&format)
    }

    fn create_recorder(
        &mut self,
        stream: &dyn CaptureStream,
        options: RecorderOptions,
        sink: RecorderSink,
    ) -> MockreelResult<Box<dyn MediaRecorder>> {
        if !stream.is_live() {
            return Err(MockreelError::recorder("Stream has already ended"));
        }
        with_probe(&self.probe, |p| p.recorder_options = Some(options));
        Ok(Box::new(SimulatedRecorder {
            options,
            state: RecorderState::Inactive,
            region: stream.cropped_to(),
            settings: stream.settings(),
            fail_start: self.config.fail_recorder_start,
            sink,
            probe: Arc::clone(&self.probe),
        }))
    }
}

struct SimulatedStream {
    id: String,
    settings: (u32, u32, u32),
    crop_supported: bool,
    fail_crop: bool,
    cropped_to: Option<StageRect>,
    live: bool,
    probe: SharedProbe,
}

#[async_trait::async_trait]
impl CaptureStream for SimulatedStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn settings(&self) -> (u32, u32, u32) {
        self.settings
    }

    fn supports_crop(&self) -> bool {
        self.crop_supported
    }

    async fn crop_to(&mut self, region: StageRect) -> MockreelResult<()> {
        if !self.crop_supported {
            return Err(MockreelError::unsupported("Track cannot be cropped"));
        }
        if self.fail_crop {
            return Err(MockreelError::capture("Crop target was rejected"));
        }
        self.cropped_to = Some(region);
        with_probe(&self.probe, |p| p.cropped_to = Some(region));
        Ok(())
    }

    fn cropped_to(&self) -> Option<StageRect> {
        self.cropped_to
    }

    fn stop_all_tracks(&mut self) {
        if self.live {
            self.live = false;
            with_probe(&self.probe, |p| p.tracks_stopped += 1);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

struct SimulatedRecorder {
    options: RecorderOptions,
    state: RecorderState,
    region: Option<StageRect>,
    settings: (u32, u32, u32),
    fail_start: bool,
    sink: RecorderSink,
    probe: SharedProbe,
}

impl SimulatedRecorder {
    fn payload(&self) -> Vec<u8> {
        let (width, height, fps) = match self.region {
            Some(rect) => {
                let (_, _, w, h) = rect.to_pixel_region();
                (w, h, self.settings.2)
            }
            None => self.settings,
        };
        format!(
            "MOCKREEL {} {}x{}@{} {}bps\n",
            self.options.container.mime_type(),
            width,
            height,
            fps,
            self.options.video_bits_per_second
        )
        .into_bytes()
    }
}

impl MediaRecorder for SimulatedRecorder {
    fn start(&mut self) -> MockreelResult<()> {
        if self.fail_start {
            return Err(MockreelError::recorder("Recorder refused to start"));
        }
        if self.state != RecorderState::Inactive {
            return Err(MockreelError::recorder("Recorder already started"));
        }
        self.state = RecorderState::Recording;
        with_probe(&self.probe, |p| p.recorder_starts += 1);
        Ok(())
    }

    fn stop(&mut self) -> MockreelResult<()> {
        if self.state == RecorderState::Inactive {
            return Ok(());
        }
        self.state = RecorderState::Inactive;
        with_probe(&self.probe, |p| p.recorder_stops += 1);

        // Real recorders may flush an empty chunk before the last one.
        let events = [
            RecorderEvent::DataAvailable(Vec::new()),
            RecorderEvent::DataAvailable(self.payload()),
            RecorderEvent::Stopped,
        ];
        for event in events {
            if self.sink.send(event).is_err() {
                tracing::debug!("Recorder sink closed before stop completed");
                break;
            }
        }
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn container(&self) -> ContainerFormat {
        self.options.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn grants_stream_within_platform_limits() {
        let mut backend = SimulatedBackend::new(SimulatedConfig {
            max_settings: (1920, 1080, 30),
            ..SimulatedConfig::default()
        });
        let stream = backend
            .get_display_media(&DisplayMediaRequest::current_tab(3840, 2160, 60))
            .await
            .unwrap();
        assert_eq!(stream.settings(), (1920, 1080, 30));
        assert_eq!(backend.probe().lock().unwrap().requests.len(), 1);
    }

    #[tokio::test]
    async fn denied_permission_is_reported() {
        let mut backend = SimulatedBackend::new(SimulatedConfig {
            deny_permission: true,
            ..SimulatedConfig::default()
        });
        let err = backend
            .get_display_media(&DisplayMediaRequest::current_tab(1, 1, 1))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, MockreelError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn recorder_emits_chunks_then_stop() {
        let mut backend = SimulatedBackend::default();
        let mut stream = backend
            .get_display_media(&DisplayMediaRequest::current_tab(3840, 2160, 60))
            .await
            .unwrap();
        stream
            .crop_to(StageRect::new(10.0, 20.0, 400.5, 300.0))
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let options = RecorderOptions {
            container: ContainerFormat::WebM,
            video_bits_per_second: 1_000,
        };
        let mut recorder = backend.create_recorder(&*stream, options, tx).unwrap();
        recorder.start().unwrap();
        recorder.stop().unwrap();
        recorder.stop().unwrap();

        assert_eq!(rx.recv().await, Some(RecorderEvent::DataAvailable(Vec::new())));
        let Some(RecorderEvent::DataAvailable(payload)) = rx.recv().await else {
            panic!("expected payload chunk");
        };
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            "MOCKREEL video/webm 401x300@60 1000bps\n"
        );
        assert_eq!(rx.recv().await, Some(RecorderEvent::Stopped));
        assert_eq!(backend.probe().lock().unwrap().recorder_stops, 1);
    }

    #[tokio::test]
    async fn rejected_crop_leaves_stream_uncropped() {
        let mut backend = SimulatedBackend::new(SimulatedConfig {
            fail_crop: true,
            ..SimulatedConfig::default()
        });
        let mut stream = backend
            .get_display_media(&DisplayMediaRequest::current_tab(1080, 1080, 30))
            .await
            .unwrap();
        assert!(stream.supports_crop());

        let err = stream
            .crop_to(StageRect::new(0.0, 0.0, 100.0, 100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, MockreelError::Capture { .. }));
        assert_eq!(stream.cropped_to(), None);
        assert_eq!(backend.probe().lock().unwrap().cropped_to, None);
    }
}
