//! Running a recording pass to completion.
//!
//! The driver alternates between the session and its [`Stage`]: it lets
//! the session react to the store, then sleeps (or jumps) to whichever of
//! the two needs attention next. Everything happens on the calling task.

use std::time::Duration;

use serde::Serialize;

use mockreel_common::error::MockreelResult;
use mockreel_scene_store::SessionStore;

use crate::artifact::Artifact;
use crate::session::RecordingSession;
use crate::stage::Stage;

/// How virtual time relates to wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pace {
    /// Sleep on tokio timers so the stage can be filmed.
    #[default]
    RealTime,
    /// Jump straight to the next deadline.
    Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct DriveOptions {
    pub pace: Pace,
    /// Stop the recording if the pass has not finished by then.
    pub max_duration: Duration,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            pace: Pace::RealTime,
            max_duration: Duration::from_secs(15 * 60),
        }
    }
}

/// Something observable that happened during the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    SceneActivated { scene: usize },
    PlaybackStarted { scene: usize },
    PlaybackPaused { scene: usize },
    SceneReset { scene: usize },
    RecordingStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    #[serde(with = "millis")]
    pub at: Duration,
    #[serde(flatten)]
    pub event: TimelineEvent,
}

/// Outcome of a driven pass.
#[derive(Debug, Default)]
pub struct DriveReport {
    pub timeline: Vec<TimelineEntry>,
    pub artifact: Option<Artifact>,
    /// Whether the pass was cut short by the time limit.
    pub timed_out: bool,
}

impl DriveReport {
    /// Instants at which each scene became active, in order.
    pub fn scene_switches(&self) -> Vec<(Duration, usize)> {
        self.timeline
            .iter()
            .filter_map(|entry| match entry.event {
                TimelineEvent::SceneActivated { scene } => Some((entry.at, scene)),
                _ => None,
            })
            .collect()
    }
}

/// Store fields the timeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observed {
    scene: usize,
    playing: bool,
    reset_signal: u64,
    exporting: bool,
}

impl Observed {
    fn read(store: &dyn SessionStore) -> Self {
        Self {
            scene: store.active_index(),
            playing: store.is_playing(),
            reset_signal: store.reset_signal(),
            exporting: store.is_exporting(),
        }
    }

    fn diff(self, next: Observed, at: Duration, timeline: &mut Vec<TimelineEntry>) {
        let mut push = |event| timeline.push(TimelineEntry { at, event });
        if next.scene != self.scene {
            push(TimelineEvent::SceneActivated { scene: next.scene });
        }
        if next.reset_signal != self.reset_signal {
            push(TimelineEvent::SceneReset { scene: next.scene });
        }
        match (self.playing, next.playing) {
            (false, true) => push(TimelineEvent::PlaybackStarted { scene: next.scene }),
            (true, false) => push(TimelineEvent::PlaybackPaused { scene: next.scene }),
            _ => {}
        }
        if self.exporting && !next.exporting {
            push(TimelineEvent::RecordingStopped);
        }
    }
}

/// Start a recording and run it until the last scene finishes.
pub async fn drive<S: SessionStore>(
    session: &mut RecordingSession<S>,
    stage: &mut dyn Stage,
    options: DriveOptions,
) -> MockreelResult<DriveReport> {
    let mut report = DriveReport::default();
    let mut observed = Observed::read(session.store());

    session.start_region_recording().await?;
    let started_at = session.now();
    let deadline = started_at.saturating_add(options.max_duration);
    report.timeline.push(TimelineEntry {
        at: started_at,
        event: TimelineEvent::SceneActivated {
            scene: session.store().active_index(),
        },
    });
    observed = Observed {
        scene: session.store().active_index(),
        ..observed
    };

    loop {
        let now = session.now();
        stage.update(session.store_mut(), now);
        session.observe();

        let current = Observed::read(session.store());
        observed.diff(current, session.now(), &mut report.timeline);
        observed = current;

        if !session.is_recording() {
            break;
        }

        let next = [session.next_deadline(), stage.next_wake()]
            .into_iter()
            .flatten()
            .min();
        let Some(next) = next else {
            tracing::warn!(phase = ?session.phase(), "Recording pass stalled, stopping");
            session.stop_region_recording();
            continue;
        };
        if next > deadline {
            tracing::warn!(limit = ?options.max_duration, "Recording pass exceeded its time limit");
            session.advance_to(deadline);
            session.stop_region_recording();
            report.timed_out = true;
            continue;
        }

        if options.pace == Pace::RealTime {
            let wait = next.saturating_sub(session.now());
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
        session.advance_to(next);
    }

    session.wait_finalized().await;
    report.artifact = session.take_artifact();
    tracing::info!(
        events = report.timeline.len(),
        recorded = report.artifact.is_some(),
        "Recording pass complete"
    );
    Ok(report)
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
