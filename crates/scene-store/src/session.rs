//! The orchestrator's view of the store.
//!
//! Recording only needs to read the scene order and a handful of flags, and
//! to drive the active scene, the reset signal and playback. [`SessionStore`]
//! is exactly that surface; the orchestrator receives an implementation by
//! injection instead of reaching into global state.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use mockreel_scene_model::{Dimensions, SceneId, SceneTarget};

use crate::store::SceneStore;

/// Narrow read/write contract used by the recording orchestrator.
pub trait SessionStore {
    fn scene_count(&self) -> usize;

    /// Id of the scene at `index`, if any.
    fn scene_id_at(&self, index: usize) -> Option<SceneId>;

    /// Index the active target currently resolves to.
    fn active_index(&self) -> usize;

    fn is_playing(&self) -> bool;
    fn is_exporting(&self) -> bool;
    fn animation_finished(&self) -> bool;
    fn reset_signal(&self) -> u64;
    fn locked_dimensions(&self) -> Option<Dimensions>;

    /// Point the active target at the scene at `index`.
    fn activate_scene(&mut self, index: usize);

    fn trigger_reset(&mut self);
    fn set_playing(&mut self, playing: bool);
    fn set_animation_finished(&mut self, finished: bool);
    fn lock_dimensions(&mut self, dimensions: Option<Dimensions>);

    /// Exporting on, playback paused, pending pulse cleared.
    fn begin_export(&mut self);

    /// Exporting, playback and pulse off; dimensions unlocked.
    fn end_export(&mut self);
}

impl SessionStore for SceneStore {
    fn scene_count(&self) -> usize {
        self.scenes().len()
    }

    fn scene_id_at(&self, index: usize) -> Option<SceneId> {
        self.scenes().get(index).map(|s| s.id.clone())
    }

    fn active_index(&self) -> usize {
        SceneStore::active_index(self)
    }

    fn is_playing(&self) -> bool {
        self.state().is_playing
    }

    fn is_exporting(&self) -> bool {
        self.state().is_exporting
    }

    fn animation_finished(&self) -> bool {
        self.state().animation_finished
    }

    fn reset_signal(&self) -> u64 {
        self.state().reset_scroll_signal
    }

    fn locked_dimensions(&self) -> Option<Dimensions> {
        self.state().locked_dimensions
    }

    fn activate_scene(&mut self, index: usize) {
        if let Some(id) = self.scene_id_at(index) {
            self.set_active_scene(SceneTarget::Scene(id));
        }
    }

    fn trigger_reset(&mut self) {
        SceneStore::trigger_reset(self);
    }

    fn set_playing(&mut self, playing: bool) {
        self.set_is_playing(playing);
    }

    fn set_animation_finished(&mut self, finished: bool) {
        SceneStore::set_animation_finished(self, finished);
    }

    fn lock_dimensions(&mut self, dimensions: Option<Dimensions>) {
        self.set_locked_dimensions(dimensions);
    }

    fn begin_export(&mut self) {
        SceneStore::begin_export(self);
    }

    fn end_export(&mut self) {
        SceneStore::end_export(self);
    }
}

/// Single-threaded shared handle, for when the orchestrator and a rendering
/// collaborator both need the same store.
#[derive(Debug, Clone, Default)]
pub struct SharedSceneStore(Rc<RefCell<SceneStore>>);

impl SharedSceneStore {
    pub fn new(store: SceneStore) -> Self {
        Self(Rc::new(RefCell::new(store)))
    }

    /// Borrow the full store for reading.
    ///
    /// Panics if a mutable borrow is live (e.g. from inside a listener).
    pub fn borrow(&self) -> Ref<'_, SceneStore> {
        self.0.borrow()
    }

    /// Borrow the full store for editing.
    pub fn borrow_mut(&self) -> RefMut<'_, SceneStore> {
        self.0.borrow_mut()
    }
}

impl SessionStore for SharedSceneStore {
    fn scene_count(&self) -> usize {
        self.borrow().scene_count()
    }

    fn scene_id_at(&self, index: usize) -> Option<SceneId> {
        self.borrow().scene_id_at(index)
    }

    fn active_index(&self) -> usize {
        SessionStore::active_index(&*self.borrow())
    }

    fn is_playing(&self) -> bool {
        self.borrow().state().is_playing
    }

    fn is_exporting(&self) -> bool {
        self.borrow().state().is_exporting
    }

    fn animation_finished(&self) -> bool {
        self.borrow().state().animation_finished
    }

    fn reset_signal(&self) -> u64 {
        self.borrow().state().reset_scroll_signal
    }

    fn locked_dimensions(&self) -> Option<Dimensions> {
        self.borrow().state().locked_dimensions
    }

    fn activate_scene(&mut self, index: usize) {
        self.borrow_mut().activate_scene(index);
    }

    fn trigger_reset(&mut self) {
        self.borrow_mut().trigger_reset();
    }

    fn set_playing(&mut self, playing: bool) {
        self.borrow_mut().set_is_playing(playing);
    }

    fn set_animation_finished(&mut self, finished: bool) {
        self.borrow_mut().set_animation_finished(finished);
    }

    fn lock_dimensions(&mut self, dimensions: Option<Dimensions>) {
        self.borrow_mut().set_locked_dimensions(dimensions);
    }

    fn begin_export(&mut self) {
        self.borrow_mut().begin_export();
    }

    fn end_export(&mut self) {
        self.borrow_mut().end_export();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_scene_sets_literal_target() {
        let mut store = SceneStore::new();
        store.add_scene();
        store.add_scene();
        store.set_active_scene(SceneTarget::Outro);

        SessionStore::activate_scene(&mut store, 0);
        let first = store.scenes()[0].id.clone();
        assert_eq!(store.active_target(), &SceneTarget::Scene(first));

        SessionStore::activate_scene(&mut store, 7);
        assert_eq!(SessionStore::active_index(&store), 0);
    }

    #[test]
    fn shared_handle_sees_writes_from_clones() {
        let shared = SharedSceneStore::new(SceneStore::new());
        let mut writer = shared.clone();

        writer.set_playing(true);
        writer.trigger_reset();

        assert!(shared.is_playing());
        assert_eq!(shared.reset_signal(), 1);
        assert_eq!(shared.borrow().state().reset_scroll_signal, 1);
    }
}
