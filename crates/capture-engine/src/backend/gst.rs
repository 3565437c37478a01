//! X11 region capture through GStreamer.
//!
//! The "display stream" is an `ximagesrc` source; cropping narrows its
//! `startx/starty/endx/endy` window to the stage. The recorder encodes into
//! a temporary file and hands the finished bytes to the sink as one chunk
//! once EOS has drained the pipeline.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use gst::prelude::*;
use gstreamer as gst;

use mockreel_common::error::{MockreelError, MockreelResult};
use mockreel_platform_core::{
    CaptureBackend, CaptureStream, ContainerFormat, DisplayMediaRequest, MediaRecorder,
    RecorderEvent, RecorderOptions, RecorderSink, RecorderState, StageRect,
};

const EOS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn init_gstreamer() -> MockreelResult<()> {
    gst::init().map_err(|e| MockreelError::capture(format!("Failed to initialize GStreamer: {e}")))
}

/// Hand the finished file to the sink, followed by the stop event.
fn deliver_recording(sink: &RecorderSink, bytes: Vec<u8>) {
    for event in [RecorderEvent::DataAvailable(bytes), RecorderEvent::Stopped] {
        if sink.send(event).is_err() {
            tracing::debug!("Recorder sink closed before stop completed");
            break;
        }
    }
}

fn has_elements(names: &[&str]) -> bool {
    names
        .iter()
        .all(|name| gst::ElementFactory::find(name).is_some())
}

/// Elements each container needs, encoder first.
fn required_elements(format: ContainerFormat) -> &'static [&'static str] {
    match format {
        ContainerFormat::Mp4 => &["x264enc", "h264parse", "mp4mux"],
        ContainerFormat::WebM => &["vp8enc", "webmmux"],
    }
}

fn encoder_launch(options: &RecorderOptions) -> String {
    match options.container {
        ContainerFormat::Mp4 => format!(
            "x264enc bitrate={} speed-preset=veryfast tune=zerolatency ! h264parse ! mp4mux",
            (options.video_bits_per_second / 1000).max(1)
        ),
        ContainerFormat::WebM => format!(
            "vp8enc target-bitrate={} deadline=1 ! webmmux",
            options.video_bits_per_second
        ),
    }
}

/// Capture backend for an X11 display.
pub struct GstBackend {
    stage: Option<StageRect>,
    display: Option<String>,
    recordings: u32,
}

impl GstBackend {
    /// `stage` is the on-screen stage region in root-window pixels.
    pub fn new(stage: Option<StageRect>, display: Option<String>) -> Self {
        Self {
            stage,
            display,
            recordings: 0,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for GstBackend {
    fn name(&self) -> &str {
        "gstreamer-x11"
    }

    fn stage_bounds(&self) -> Option<StageRect> {
        self.stage
    }

    fn supports_crop_target(&self) -> bool {
        true
    }

    async fn get_display_media(
        &mut self,
        request: &DisplayMediaRequest,
    ) -> MockreelResult<Box<dyn CaptureStream>> {
        init_gstreamer()?;
        if !has_elements(&["ximagesrc", "videoconvert", "videorate"]) {
            return Err(MockreelError::unsupported(
                "ximagesrc is not available; install gst-plugins-good",
            ));
        }
        self.recordings += 1;
        Ok(Box::new(GstStream {
            id: format!("ximagesrc-{}", self.recordings),
            display: self.display.clone(),
            settings: (
                request.ideal_width,
                request.ideal_height,
                request.ideal_frame_rate,
            ),
            region: None,
            live: true,
        }))
    }

    fn is_type_supported(&self, format: ContainerFormat) -> bool {
        init_gstreamer().is_ok() && has_elements(required_elements(format))
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
        let output = std::env::temp_dir().join(format!(
            "mockreel-{}-{}.{}",
            std::process::id(),
            self.recordings,
            options.container.extension()
        ));

        let mut source = String::from("ximagesrc use-damage=false show-pointer=false");
        if let Some(display) = &self.display {
            source.push_str(&format!(" display-name={display}"));
        }
        if let Some(region) = stream.cropped_to() {
            let (x, y, w, h) = region.to_pixel_region();
            // endx/endy are inclusive.
            source.push_str(&format!(
                " startx={} starty={} endx={} endy={}",
                x.max(0),
                y.max(0),
                x.max(0) + w as i32 - 1,
                y.max(0) + h as i32 - 1
            ));
        }
        let (_, _, fps) = stream.settings();
        let launch = format!(
            "{source} ! videoconvert ! videorate ! video/x-raw,framerate={fps}/1 ! {} ! filesink location=\"{}\"",
            encoder_launch(&options),
            output.display()
        );
        tracing::debug!(%launch, "Building recorder pipeline");

        let pipeline = gst::parse::launch(&launch)
            .map_err(|e| MockreelError::recorder(format!("Failed to build pipeline: {e}")))?
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| MockreelError::recorder("Launch string did not produce a pipeline"))?;

        Ok(Box::new(GstRecorder {
            pipeline,
            options,
            output,
            sink,
            state: RecorderState::Inactive,
        }))
    }
}

struct GstStream {
    id: String,
    display: Option<String>,
    settings: (u32, u32, u32),
    region: Option<StageRect>,
    live: bool,
}

#[async_trait::async_trait]
impl CaptureStream for GstStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn settings(&self) -> (u32, u32, u32) {
        match self.region {
            Some(region) => {
                let (_, _, w, h) = region.to_pixel_region();
                (w, h, self.settings.2)
            }
            None => self.settings,
        }
    }

    fn supports_crop(&self) -> bool {
        true
    }

    async fn crop_to(&mut self, region: StageRect) -> MockreelResult<()> {
        if region.is_empty() {
            return Err(MockreelError::capture("Cannot crop to an empty region"));
        }
        tracing::debug!(display = ?self.display, ?region, "Cropping ximagesrc");
        self.region = Some(region);
        Ok(())
    }

    fn cropped_to(&self) -> Option<StageRect> {
        self.region
    }

    fn stop_all_tracks(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

struct GstRecorder {
    pipeline: gst::Pipeline,
    options: RecorderOptions,
    output: PathBuf,
    sink: RecorderSink,
    state: RecorderState,
}

impl GstRecorder {
    /// Send EOS and wait for it to reach the sink so the muxer can write
    /// its trailer.
    fn drain(&self) {
        if !self.pipeline.send_event(gst::event::Eos::new()) {
            tracing::warn!("Failed to send EOS; recording may be truncated");
            return;
        }
        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        let started = Instant::now();
        loop {
            let Some(remaining) = EOS_DRAIN_TIMEOUT.checked_sub(started.elapsed()) else {
                tracing::warn!("EOS drain timed out");
                return;
            };
            let timeout = gst::ClockTime::from_nseconds(remaining.as_nanos() as u64);
            match bus.timed_pop(timeout) {
                Some(msg) => match msg.view() {
                    gst::MessageView::Eos(_) => return,
                    gst::MessageView::Error(e) => {
                        tracing::warn!(error = %e.error(), "Pipeline error during EOS drain");
                        return;
                    }
                    _ => {}
                },
                None => {
                    tracing::warn!("EOS drain timed out");
                    return;
                }
            }
        }
    }
}

impl MediaRecorder for GstRecorder {
    fn start(&mut self) -> MockreelResult<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| MockreelError::recorder(format!("Failed to start recorder: {e:?}")))?;
        self.state = RecorderState::Recording;
        tracing::info!(
            output = %self.output.display(),
            container = %self.options.container,
            "GStreamer recorder started"
        );
        Ok(())
    }

    fn stop(&mut self) -> MockreelResult<()> {
        if self.state == RecorderState::Inactive {
            return Ok(());
        }
        self.drain();
        self.state = RecorderState::Inactive;
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| MockreelError::recorder(format!("Failed to stop recorder: {e:?}")))?;

        let bytes = std::fs::read(&self.output)?;
        if let Err(e) = std::fs::remove_file(&self.output) {
            tracing::debug!(error = %e, "Could not remove recorder temp file");
        }
        deliver_recording(&self.sink, bytes);
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn container(&self) -> ContainerFormat {
        self.options.container
    }
}

impl Drop for GstRecorder {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
