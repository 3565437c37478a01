//! Recording session orchestration.
//!
//! [`RecordingSession`] ties a capture backend, the scene store and the
//! [`Sequencer`] together. It owns a virtual-time [`Scheduler`] for the
//! sequence's delayed steps; a driver advances that clock and feeds the
//! store's "animation finished" pulse back in through [`RecordingSession::observe`].

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};

use mockreel_common::config::{AppConfig, CaptureDefaults, SequenceTimings};
use mockreel_common::error::{MockreelError, MockreelResult};
use mockreel_platform_core::{
    select_container, CaptureBackend, CaptureStream, ContainerFormat, DisplayMediaRequest,
    MediaRecorder, RecorderEvent, RecorderOptions, RecorderState, StageRect,
};
use mockreel_scene_model::Dimensions;
use mockreel_scene_store::SessionStore;

use crate::artifact::Artifact;
use crate::scheduler::Scheduler;
use crate::sequence::{Effect, SequencePhase, Sequencer, Timer};

/// Settings for a recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Display capture hints and recorder settings.
    pub capture: CaptureDefaults,

    /// Delays of the scene sequence.
    pub timings: SequenceTimings,

    /// Crop the stream to the stage when the platform allows it.
    pub crop_to_stage: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            capture: config.capture.clone(),
            timings: config.timings,
            crop_to_stage: true,
        }
    }
}

impl SessionConfig {
    /// Container preference parsed from the configured MIME types.
    /// Unknown entries are skipped; an empty result falls back to MP4, WebM.
    pub fn container_preference(&self) -> Vec<ContainerFormat> {
        let parsed: Vec<ContainerFormat> = self
            .capture
            .container_preference
            .iter()
            .filter_map(|mime| {
                let format = ContainerFormat::from_mime(mime);
                if format.is_none() {
                    tracing::warn!(mime = %mime, "Ignoring unknown container type");
                }
                format
            })
            .collect();
        if parsed.is_empty() {
            vec![ContainerFormat::Mp4, ContainerFormat::WebM]
        } else {
            parsed
        }
    }
}

/// State of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No capture in progress.
    Idle,
    /// Waiting for the platform to grant a display stream.
    RequestingCapture,
    /// Recorder running.
    Recording,
    /// Recorder stopped; waiting for its final events.
    Finalizing,
}

/// Stream and recorder held for the duration of one recording.
struct ActiveCapture {
    stream: Box<dyn CaptureStream>,
    recorder: Box<dyn MediaRecorder>,
    events: UnboundedReceiver<RecorderEvent>,
    container: ContainerFormat,
    started_at: Duration,
    stopped_at: Option<Duration>,
}

/// Automated capture pass over every scene in the store.
pub struct RecordingSession<S: SessionStore> {
    config: SessionConfig,
    store: S,
    backend: Box<dyn CaptureBackend>,
    scheduler: Scheduler<Timer>,
    sequencer: Sequencer,
    state: SessionState,
    is_recording: bool,
    active: Option<ActiveCapture>,
    chunks: Vec<Vec<u8>>,
    artifact: Option<Artifact>,
}

impl<S: SessionStore> RecordingSession<S> {
    pub fn new(store: S, backend: Box<dyn CaptureBackend>, config: SessionConfig) -> Self {
        let sequencer = Sequencer::new(config.timings);
        Self {
            config,
            store,
            backend,
            scheduler: Scheduler::new(),
            sequencer,
            state: SessionState::Idle,
            is_recording: false,
            active: None,
            chunks: Vec::new(),
            artifact: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn phase(&self) -> SequencePhase {
        self.sequencer.phase()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Deadline of the next pending sequence step.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Number of sequence steps still scheduled.
    pub fn pending_steps(&self) -> usize {
        self.scheduler.pending()
    }

    /// The most recent finished recording.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn take_artifact(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn backend(&self) -> &dyn CaptureBackend {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin an automated recording pass.
    ///
    /// On any failure before the recorder is running, the session is left
    /// idle: tracks released, dimensions unlocked, no artifact.
    pub async fn start_region_recording(&mut self) -> MockreelResult<()> {
        if self.state != SessionState::Idle {
            return Err(MockreelError::capture("Recording already in progress"));
        }

        tracing::info!(backend = self.backend.name(), "Starting region recording");
        self.artifact = None;
        self.chunks.clear();
        self.state = SessionState::RequestingCapture;

        let stage = self.backend.stage_bounds();
        if let Some(rect) = stage {
            self.store
                .lock_dimensions(Some(Dimensions::new(rect.width, rect.height)));
        }

        let active = match self.acquire_capture(stage).await {
            Ok(active) => active,
            Err(e) => {
                if e.is_capability_failure() {
                    tracing::warn!(error = %e, "Region recording not available");
                } else {
                    tracing::error!(error = %e, "Failed to start region recording");
                }
                self.store.lock_dimensions(None);
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        tracing::info!(
            stream = active.stream.id(),
            container = %active.container,
            "Recorder running"
        );
        self.active = Some(active);
        self.is_recording = true;
        self.state = SessionState::Recording;
        self.store.begin_export();

        let effects = self.sequencer.start();
        self.apply(effects);
        Ok(())
    }

    /// Request the stream, crop it, and start a recorder on it. The stream
    /// is released again if anything after the request fails.
    async fn acquire_capture(
        &mut self,
        stage: Option<StageRect>,
    ) -> MockreelResult<ActiveCapture> {
        let capture = &self.config.capture;
        let request = DisplayMediaRequest::current_tab(
            capture.ideal_width,
            capture.ideal_height,
            capture.ideal_frame_rate,
        );
        let mut stream = self.backend.get_display_media(&request).await?;
        let (width, height, fps) = stream.settings();
        tracing::info!(width, height, fps, "Display stream granted");

        match self.start_recorder(stream.as_mut(), stage).await {
            Ok((recorder, events, container)) => Ok(ActiveCapture {
                stream,
                recorder,
                events,
                container,
                started_at: self.scheduler.now(),
                stopped_at: None,
            }),
            Err(e) => {
                stream.stop_all_tracks();
                Err(e)
            }
        }
    }

    async fn start_recorder(
        &mut self,
        stream: &mut dyn CaptureStream,
        stage: Option<StageRect>,
    ) -> MockreelResult<(
        Box<dyn MediaRecorder>,
        UnboundedReceiver<RecorderEvent>,
        ContainerFormat,
    )> {
        let can_crop = self.config.crop_to_stage
            && self.backend.supports_crop_target()
            && stream.supports_crop();
        match stage {
            Some(rect) if can_crop && !rect.is_empty() => {
                stream.crop_to(rect).await?;
                tracing::info!(?rect, "Stream cropped to stage");
            }
            _ => {
                tracing::warn!("Region capture unavailable, recording the full surface");
            }
        }

        let preference = self.config.container_preference();
        let backend = &self.backend;
        let container = select_container(&preference, |format| {
            let supported = backend.is_type_supported(format);
            if !supported {
                tracing::debug!(%format, "Container not supported");
            }
            supported
        })
        .ok_or_else(|| MockreelError::recorder("No container format configured"))?;

        let (sink, events) = mpsc::unbounded_channel();
        let options = RecorderOptions {
            container,
            video_bits_per_second: self.config.capture.video_bits_per_second,
        };
        let mut recorder = self.backend.create_recorder(&*stream, options, sink)?;
        recorder.start()?;
        Ok((recorder, events, container))
    }

    /// Stop the recorder and end export mode.
    ///
    /// Safe to call at any time; does nothing unless a recorder is running.
    pub fn stop_region_recording(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.recorder.state() == RecorderState::Inactive {
            return;
        }

        let cancelled = self.scheduler.cancel_all();
        self.sequencer.cancel();
        tracing::info!(cancelled_steps = cancelled, "Stopping region recording");

        active.stopped_at = Some(self.scheduler.now());
        let stop_result = active.recorder.stop();
        self.is_recording = false;
        self.state = SessionState::Finalizing;
        self.store.end_export();

        if let Err(e) = stop_result {
            tracing::error!(error = %e, "Recorder failed to stop, discarding recording");
            if let Some(mut active) = self.active.take() {
                active.stream.stop_all_tracks();
            }
            self.chunks.clear();
            self.state = SessionState::Idle;
            return;
        }

        self.pump_recorder_events();
    }

    /// Drain recorder events that are already queued.
    pub fn pump_recorder_events(&mut self) {
        loop {
            let Some(active) = self.active.as_mut() else {
                return;
            };
            let received = active.events.try_recv();
            match received {
                Ok(event) => self.handle_recorder_event(event),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    if self.state == SessionState::Finalizing {
                        tracing::warn!("Recorder closed without a stop event");
                        self.finalize();
                    }
                    return;
                }
            }
        }
    }

    /// Wait until the recorder has delivered its final events.
    pub async fn wait_finalized(&mut self) {
        while self.state == SessionState::Finalizing {
            let Some(active) = self.active.as_mut() else {
                self.state = SessionState::Idle;
                return;
            };
            let received = active.events.recv().await;
            match received {
                Some(event) => self.handle_recorder_event(event),
                None => {
                    tracing::warn!("Recorder closed without a stop event");
                    self.finalize();
                }
            }
        }
    }

    fn handle_recorder_event(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::DataAvailable(chunk) if chunk.is_empty() => {}
            RecorderEvent::DataAvailable(chunk) => {
                tracing::trace!(bytes = chunk.len(), "Recorder chunk");
                self.chunks.push(chunk);
            }
            RecorderEvent::Stopped => self.finalize(),
        }
    }

    fn finalize(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        let stopped_at = active.stopped_at.unwrap_or_else(|| self.scheduler.now());
        let artifact = Artifact::from_chunks(
            active.container,
            std::mem::take(&mut self.chunks),
            self.config.capture.suggested_filename.clone(),
            stopped_at.saturating_sub(active.started_at),
        );
        active.stream.stop_all_tracks();

        tracing::info!(
            bytes = artifact.len(),
            mime = artifact.mime_type(),
            url = %artifact.url(),
            "Recording finalized"
        );
        self.artifact = Some(artifact);
        self.is_recording = false;
        self.state = SessionState::Idle;
    }

    /// React to the store: consume an "animation finished" pulse if one is
    /// pending while recording. Also drains recorder events.
    pub fn observe(&mut self) {
        self.pump_recorder_events();
        if !self.is_recording || !self.store.animation_finished() {
            return;
        }
        let current = self.store.active_index();
        let count = self.store.scene_count();
        let effects = self.sequencer.on_animation_finished(current, count);
        self.apply(effects);
    }

    /// Fire every sequence step due at or before `to`, then move virtual
    /// time there.
    pub fn advance_to(&mut self, to: Duration) {
        while let Some((_, timer)) = self.scheduler.pop_due(to) {
            let effects = self.sequencer.on_timer(timer);
            self.apply(effects);
        }
        self.scheduler.advance_to(to);
    }

    /// Advance virtual time by `by`.
    pub fn advance(&mut self, by: Duration) {
        let to = self.scheduler.now().saturating_add(by);
        self.advance_to(to);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ClearFinished => self.store.set_animation_finished(false),
                Effect::SetPlaying(playing) => self.store.set_playing(playing),
                Effect::ActivateScene(index) => {
                    tracing::debug!(scene = index, "Activating scene");
                    self.store.activate_scene(index);
                }
                Effect::TriggerReset => self.store.trigger_reset(),
                Effect::Schedule { after, timer } => {
                    self.scheduler.schedule(after, timer);
                }
                Effect::FinishRecording => {
                    tracing::info!("All scenes recorded");
                    self.stop_region_recording();
                }
            }
        }
    }
}

impl<S: SessionStore> Drop for RecordingSession<S> {
    fn drop(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if active.recorder.state() != RecorderState::Inactive {
                let _ = active.recorder.stop();
            }
            active.stream.stop_all_tracks();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_preference_parses_configured_mimes() {
        let mut config = SessionConfig::default();
        assert_eq!(
            config.container_preference(),
            vec![ContainerFormat::Mp4, ContainerFormat::WebM]
        );

        config.capture.container_preference =
            vec!["video/webm;codecs=vp9".into(), "video/x-matroska".into()];
        assert_eq!(config.container_preference(), vec![ContainerFormat::WebM]);

        config.capture.container_preference.clear();
        assert_eq!(
            config.container_preference(),
            vec![ContainerFormat::Mp4, ContainerFormat::WebM]
        );
    }

    #[test]
    fn session_config_follows_app_config() {
        let mut app = AppConfig::default();
        app.timings.settle_ms = 42;
        let config = SessionConfig::from(&app);
        assert_eq!(config.timings.settle_ms, 42);
        assert!(config.crop_to_stage);
        assert_eq!(config.capture.suggested_filename, "app-promo.mp4");
    }
}
