//! The rendering side of a recording pass.
//!
//! A [`Stage`] watches the store the way the on-screen phone mockup does:
//! it restarts its animation when the reset signal or the active scene
//! changes, advances while playback is on, and raises the "animation
//! finished" pulse once per completed pass.

use std::time::Duration;

use mockreel_scene_model::{Scene, MAX_SCROLL_SPEED};
use mockreel_scene_store::SessionStore;

/// Rendering collaborator driven alongside a recording session.
pub trait Stage {
    /// Bring the stage up to virtual time `now`, reading and writing `store`.
    fn update(&mut self, store: &mut dyn SessionStore, now: Duration);

    /// When the stage next needs an update, if it is waiting on time.
    fn next_wake(&self) -> Option<Duration>;
}

/// Time a headline stays on screen before scrolling starts.
const HOLD: Duration = Duration::from_millis(1500);

/// How long one pass of `scene` takes: a hold, then one scroll per
/// screenshot at a rate set by the scene's scroll speed.
pub fn pass_duration(scene: &Scene) -> Duration {
    let speed = u64::from(scene.scroll_speed.min(MAX_SCROLL_SPEED));
    let per_screen = Duration::from_millis(40_000 / (speed + 10));
    let screens = scene.screenshots.len().max(1) as u32;
    HOLD + per_screen * screens
}

/// Stage that plays each scene for a fixed duration.
#[derive(Debug, Clone)]
pub struct TimedStage {
    durations: Vec<Duration>,
    scene: usize,
    reset_signal: u64,
    playing: bool,
    progress: Duration,
    finished: bool,
    last_update: Duration,
}

impl TimedStage {
    /// One duration per scene, in scene order. Scenes past the end reuse
    /// the last duration.
    pub fn new(durations: Vec<Duration>) -> Self {
        Self {
            durations,
            scene: 0,
            reset_signal: 0,
            playing: false,
            progress: Duration::ZERO,
            finished: false,
            last_update: Duration::ZERO,
        }
    }

    /// Durations derived from the scenes' content.
    pub fn for_scenes(scenes: &[Scene]) -> Self {
        Self::new(scenes.iter().map(pass_duration).collect())
    }

    fn duration(&self, scene: usize) -> Duration {
        self.durations
            .get(scene)
            .or_else(|| self.durations.last())
            .copied()
            .unwrap_or(HOLD)
    }
}

impl Stage for TimedStage {
    fn update(&mut self, store: &mut dyn SessionStore, now: Duration) {
        let elapsed = now.saturating_sub(self.last_update);
        self.last_update = self.last_update.max(now);
        if self.playing && !self.finished {
            self.progress += elapsed;
        }

        let scene = store.active_index();
        let reset_signal = store.reset_signal();
        if scene != self.scene || reset_signal != self.reset_signal {
            self.scene = scene;
            self.reset_signal = reset_signal;
            self.progress = Duration::ZERO;
            self.finished = false;
        }

        self.playing = store.is_playing();
        if self.playing && !self.finished && self.progress >= self.duration(scene) {
            tracing::debug!(scene, "Scene animation finished");
            self.finished = true;
            store.set_animation_finished(true);
        }
    }

    fn next_wake(&self) -> Option<Duration> {
        if !self.playing || self.finished {
            return None;
        }
        let remaining = self.duration(self.scene).saturating_sub(self.progress);
        Some(self.last_update + remaining)
    }
}
