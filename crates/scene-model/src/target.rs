//! Edit targets.
//!
//! The editor can point content edits at a concrete scene or at the virtual
//! intro/outro slots. The virtual slots are not scenes of their own: they
//! borrow the first and last scene's content fields respectively, and are
//! resolved only when an edit is applied.

use serde::{Deserialize, Serialize};

use crate::scene::{Scene, SceneId};

/// What the active pointer selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SceneTarget {
    Scene(SceneId),
    Intro,
    Outro,
}

impl SceneTarget {
    /// Resolve to an index into `scenes`.
    ///
    /// `Intro` is the first scene and `Outro` the last. A `Scene` id that is
    /// no longer present falls back to the first scene. Returns `None` only
    /// for an empty slice, which the store never holds.
    pub fn resolve(&self, scenes: &[Scene]) -> Option<usize> {
        if scenes.is_empty() {
            return None;
        }
        let index = match self {
            Self::Intro => 0,
            Self::Outro => scenes.len() - 1,
            Self::Scene(id) => scenes.iter().position(|s| &s.id == id).unwrap_or(0),
        };
        Some(index)
    }

    /// Whether this is one of the virtual aliases.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::Intro | Self::Outro)
    }

    /// The literal id, for concrete targets.
    pub fn scene_id(&self) -> Option<&SceneId> {
        match self {
            Self::Scene(id) => Some(id),
            _ => None,
        }
    }
}

impl From<SceneId> for SceneTarget {
    fn from(id: SceneId) -> Self {
        Self::Scene(id)
    }
}

impl std::fmt::Display for SceneTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene(id) => write!(f, "{id}"),
            Self::Intro => f.write_str("INTRO"),
            Self::Outro => f.write_str("OUTRO"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn three_scenes() -> Vec<Scene> {
        let first = Scene::initial();
        let second = Scene::following(&first);
        let third = Scene::following(&second);
        vec![first, second, third]
    }

    #[test]
    fn aliases_resolve_to_ends() {
        let scenes = three_scenes();
        assert_eq!(SceneTarget::Intro.resolve(&scenes), Some(0));
        assert_eq!(SceneTarget::Outro.resolve(&scenes), Some(2));
    }

    #[test]
    fn literal_id_resolves_to_its_position() {
        let scenes = three_scenes();
        let target = SceneTarget::Scene(scenes[1].id.clone());
        assert_eq!(target.resolve(&scenes), Some(1));
    }

    #[test]
    fn stale_id_falls_back_to_first() {
        let scenes = three_scenes();
        let target = SceneTarget::Scene(SceneId::from("gone"));
        assert_eq!(target.resolve(&scenes), Some(0));
        assert_eq!(target.resolve(&[]), None);
    }

    #[test]
    fn display_uses_alias_tokens() {
        assert_eq!(SceneTarget::Intro.to_string(), "INTRO");
        assert_eq!(SceneTarget::Outro.to_string(), "OUTRO");
        assert!(SceneTarget::Outro.is_virtual());
    }

    proptest! {
        #[test]
        fn resolution_always_lands_inside_the_list(len in 1usize..8, pick in 0usize..12, kind in 0u8..3) {
            let mut scenes = vec![Scene::initial()];
            while scenes.len() < len {
                let next = Scene::following(scenes.last().unwrap());
                scenes.push(next);
            }
            let target = match kind {
                0 => SceneTarget::Intro,
                1 => SceneTarget::Outro,
                _ => scenes
                    .get(pick)
                    .map(|s| SceneTarget::Scene(s.id.clone()))
                    .unwrap_or_else(|| SceneTarget::Scene(SceneId::from("missing"))),
            };
            let index = target.resolve(&scenes).unwrap();
            prop_assert!(index < scenes.len());
        }
    }
}
