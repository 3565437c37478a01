//! The scene store.

use std::sync::Arc;

use mockreel_scene_model::{
    clamp_scroll_speed, clamp_volume, AspectRatio, AudioConfig, Dimensions, ImageRef,
    IntroConfig, OutroConfig, PhoneColor, Scene, SceneId, SceneTarget, TextAnimation,
};

/// Complete store state.
///
/// Large fields sit behind `Arc` and are replaced, never mutated, so
/// observers can detect a change to a field with [`Arc::ptr_eq`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Scenes in playback order. Never empty.
    pub scenes: Arc<Vec<Scene>>,

    /// Target of content edits; resolved lazily.
    pub active_target: SceneTarget,

    pub is_playing: bool,
    pub aspect_ratio: AspectRatio,
    pub is_exporting: bool,

    /// Pulsed by the rendering layer when a scene's animation pass ends.
    pub animation_finished: bool,

    /// Restart trigger; consumers react to any change of value.
    pub reset_scroll_signal: u64,

    /// Frozen stage size while a capture runs.
    pub locked_dimensions: Option<Dimensions>,

    pub intro: Arc<IntroConfig>,
    pub outro: Arc<OutroConfig>,
    pub audio: Arc<AudioConfig>,
}

impl Default for AppState {
    fn default() -> Self {
        let first = Scene::initial();
        let active_target = SceneTarget::Scene(first.id.clone());
        Self {
            scenes: Arc::new(vec![first]),
            active_target,
            is_playing: false,
            aspect_ratio: AspectRatio::Square,
            is_exporting: false,
            animation_finished: false,
            reset_scroll_signal: 0,
            locked_dimensions: None,
            intro: Arc::new(IntroConfig::default()),
            outro: Arc::new(OutroConfig::default()),
            audio: Arc::new(AudioConfig::default()),
        }
    }
}

impl AppState {
    /// Index of the scene the active target resolves to.
    pub fn active_index(&self) -> usize {
        self.active_target.resolve(&self.scenes).unwrap_or(0)
    }

    pub fn active_scene(&self) -> &Scene {
        &self.scenes[self.active_index()]
    }
}

/// Handle returned by [`SceneStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change listener: receives the previous and the next state.
pub type Listener = Box<dyn FnMut(&AppState, &AppState)>;

/// Observable scene store.
pub struct SceneStore {
    state: AppState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SceneStore {
    /// Store with the single initial scene.
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Store seeded with an explicit state.
    ///
    /// An empty scene list is replaced by the initial scene.
    pub fn with_state(mut state: AppState) -> Self {
        if state.scenes.is_empty() {
            let first = Scene::initial();
            state.active_target = SceneTarget::Scene(first.id.clone());
            state.scenes = Arc::new(vec![first]);
        }
        Self {
            state,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // Reads

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Cheap copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.state.scenes
    }

    pub fn active_target(&self) -> &SceneTarget {
        &self.state.active_target
    }

    pub fn active_index(&self) -> usize {
        self.state.active_index()
    }

    pub fn active_scene(&self) -> &Scene {
        self.state.active_scene()
    }

    pub fn scene_index(&self, id: &SceneId) -> Option<usize> {
        self.state.scenes.iter().position(|s| &s.id == id)
    }

    // Observers

    /// Register a listener called after every applied action.
    ///
    /// Listeners get read-only snapshots and must not call back into the
    /// store synchronously.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState, &AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // Scene management

    /// Append a scene that inherits the last scene's appearance and make it
    /// active.
    pub fn add_scene(&mut self) -> SceneId {
        let last = self.state.scenes.last().cloned().unwrap_or_else(Scene::initial);
        let scene = Scene::following(&last);
        let id = scene.id.clone();
        self.set(|state| {
            let mut scenes = (*state.scenes).clone();
            scenes.push(scene);
            Some(AppState {
                scenes: Arc::new(scenes),
                active_target: SceneTarget::Scene(id.clone()),
                ..state.clone()
            })
        });
        tracing::debug!(scene = %self.active_target(), count = self.scenes().len(), "Scene added");
        id
    }

    /// Remove a scene. Ignored when it is the only one left or the id is
    /// unknown. When the active scene goes, the first scene becomes active.
    pub fn remove_scene(&mut self, id: &SceneId) {
        self.set(|state| {
            if state.scenes.len() <= 1 {
                tracing::debug!(scene = %id, "Refusing to remove the last scene");
                return None;
            }
            let removed_index = state.scenes.iter().position(|s| &s.id == id)?;
            let was_active = state.active_index() == removed_index && !state.active_target.is_virtual();

            let scenes: Vec<Scene> = state
                .scenes
                .iter()
                .filter(|s| &s.id != id)
                .cloned()
                .collect();
            let active_target = if was_active {
                SceneTarget::Scene(scenes[0].id.clone())
            } else {
                state.active_target.clone()
            };
            Some(AppState {
                scenes: Arc::new(scenes),
                active_target,
                ..state.clone()
            })
        });
    }

    /// Point edits at `target`. Stored verbatim; resolved on the next edit.
    pub fn set_active_scene(&mut self, target: impl Into<SceneTarget>) {
        let target = target.into();
        self.set(|state| {
            Some(AppState {
                active_target: target,
                ..state.clone()
            })
        });
    }

    // Content of the targeted scene

    pub fn add_screenshots(&mut self, images: Vec<ImageRef>) {
        self.update_target_scene(|scene| scene.screenshots.extend(images));
    }

    /// Remove the screenshot at `index`; out-of-range indices are ignored.
    pub fn remove_screenshot(&mut self, index: usize) {
        self.update_target_scene(|scene| {
            if index < scene.screenshots.len() {
                scene.screenshots.remove(index);
            }
        });
    }

    /// Replace the screenshot list with `new_order`.
    pub fn reorder_screenshots(&mut self, new_order: Vec<ImageRef>) {
        self.update_target_scene(|scene| scene.screenshots = new_order);
    }

    pub fn update_headline(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.update_target_scene(|scene| scene.headline = text);
    }

    pub fn update_subtitle(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.update_target_scene(|scene| scene.subtitle = text);
    }

    pub fn set_phone_color(&mut self, color: PhoneColor) {
        self.update_target_scene(|scene| scene.phone_color = color);
    }

    pub fn set_background(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.update_target_scene(|scene| scene.background = token);
    }

    /// Set the scroll speed, clamped to `0..=100`.
    pub fn set_scroll_speed(&mut self, speed: i64) {
        let speed = clamp_scroll_speed(speed);
        self.update_target_scene(|scene| scene.scroll_speed = speed);
    }

    // Global session flags

    pub fn set_is_playing(&mut self, is_playing: bool) {
        self.set(|state| {
            Some(AppState {
                is_playing,
                ..state.clone()
            })
        });
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.set(|state| {
            Some(AppState {
                aspect_ratio,
                ..state.clone()
            })
        });
    }

    pub fn set_is_exporting(&mut self, is_exporting: bool) {
        self.set(|state| {
            Some(AppState {
                is_exporting,
                ..state.clone()
            })
        });
    }

    pub fn set_animation_finished(&mut self, animation_finished: bool) {
        self.set(|state| {
            Some(AppState {
                animation_finished,
                ..state.clone()
            })
        });
    }

    pub fn set_locked_dimensions(&mut self, locked_dimensions: Option<Dimensions>) {
        self.set(|state| {
            Some(AppState {
                locked_dimensions,
                ..state.clone()
            })
        });
    }

    /// Bump the restart counter. Every call yields a new, larger value.
    pub fn trigger_reset(&mut self) {
        self.set(|state| {
            Some(AppState {
                reset_scroll_signal: state.reset_scroll_signal.saturating_add(1),
                ..state.clone()
            })
        });
    }

    /// Enter export mode in a single update: exporting, paused, no pending
    /// finish pulse.
    pub fn begin_export(&mut self) {
        self.set(|state| {
            Some(AppState {
                is_exporting: true,
                is_playing: false,
                animation_finished: false,
                ..state.clone()
            })
        });
    }

    /// Leave export mode in a single update and unfreeze the layout.
    pub fn end_export(&mut self) {
        self.set(|state| {
            Some(AppState {
                is_exporting: false,
                is_playing: false,
                animation_finished: false,
                locked_dimensions: None,
                ..state.clone()
            })
        });
    }

    // Intro / outro / audio

    pub fn set_intro(&mut self, intro: IntroConfig) {
        self.set(|state| {
            Some(AppState {
                intro: Arc::new(intro),
                ..state.clone()
            })
        });
    }

    pub fn set_intro_enabled(&mut self, enabled: bool) {
        self.update_intro(|intro| intro.enabled = enabled);
    }

    pub fn set_intro_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.update_intro(|intro| intro.title = title);
    }

    pub fn set_intro_animation(&mut self, animation: TextAnimation) {
        self.update_intro(|intro| intro.animation = animation);
    }

    pub fn set_outro(&mut self, outro: OutroConfig) {
        self.set(|state| {
            Some(AppState {
                outro: Arc::new(outro),
                ..state.clone()
            })
        });
    }

    pub fn set_outro_enabled(&mut self, enabled: bool) {
        self.update_outro(|outro| outro.enabled = enabled);
    }

    pub fn set_outro_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.update_outro(|outro| outro.title = title);
    }

    pub fn set_outro_animation(&mut self, animation: TextAnimation) {
        self.update_outro(|outro| outro.animation = animation);
    }

    pub fn set_audio(&mut self, mut audio: AudioConfig) {
        audio.volume = clamp_volume(audio.volume);
        self.set(|state| {
            Some(AppState {
                audio: Arc::new(audio),
                ..state.clone()
            })
        });
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.update_audio(|audio| audio.enabled = enabled);
    }

    pub fn set_audio_track(&mut self, track: Option<String>) {
        self.update_audio(|audio| audio.track = track);
    }

    /// Set the music volume, clamped to `[0.0, 1.0]`.
    pub fn set_audio_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        self.update_audio(|audio| audio.volume = volume);
    }

    // Internal helpers

    /// Apply a whole-state update. `None` means "no change": nothing is
    /// written and nobody is notified.
    fn set(&mut self, update: impl FnOnce(&AppState) -> Option<AppState>) {
        let Some(next) = update(&self.state) else {
            return;
        };
        debug_assert!(!next.scenes.is_empty(), "scene list must never be empty");
        let previous = std::mem::replace(&mut self.state, next);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&previous, &self.state);
        }
    }

    /// Edit only the scene the active target resolves to.
    fn update_target_scene(&mut self, edit: impl FnOnce(&mut Scene)) {
        self.set(|state| {
            let index = state.active_target.resolve(&state.scenes)?;
            let mut scenes = (*state.scenes).clone();
            edit(&mut scenes[index]);
            Some(AppState {
                scenes: Arc::new(scenes),
                ..state.clone()
            })
        });
    }

    fn update_intro(&mut self, edit: impl FnOnce(&mut IntroConfig)) {
        self.set(|state| {
            let mut intro = (*state.intro).clone();
            edit(&mut intro);
            Some(AppState {
                intro: Arc::new(intro),
                ..state.clone()
            })
        });
    }

    fn update_outro(&mut self, edit: impl FnOnce(&mut OutroConfig)) {
        self.set(|state| {
            let mut outro = (*state.outro).clone();
            edit(&mut outro);
            Some(AppState {
                outro: Arc::new(outro),
                ..state.clone()
            })
        });
    }

    fn update_audio(&mut self, edit: impl FnOnce(&mut AudioConfig)) {
        self.set(|state| {
            let mut audio = (*state.audio).clone();
            edit(&mut audio);
            Some(AppState {
                audio: Arc::new(audio),
                ..state.clone()
            })
        });
    }
}
