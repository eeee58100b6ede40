//! Read-only lookups into the scene and character libraries.
//!
//! The composer resolves reference images through these traits; the
//! storyboard core never owns scene or character records.

use crate::types::{CharacterId, ImageAsset, SceneId};

/// A scene record as seen by the storyboard core.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    /// The scene's default "main" reference image, if one is set.
    pub default_reference: Option<ImageAsset>,
    /// Labelled alternates selectable as per-group scene overrides.
    pub gallery: Vec<(String, ImageAsset)>,
}

/// A character record as seen by the storyboard core.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRecord {
    pub name: String,
    /// The character's default reference image, if one is set.
    pub default_reference: Option<ImageAsset>,
    /// Labelled alternates selectable as per-shot overrides.
    pub gallery: Vec<(String, ImageAsset)>,
}

/// Read-only scene lookup.
pub trait SceneSource: Send + Sync {
    fn scene(&self, id: &SceneId) -> Option<SceneRecord>;
}

/// Read-only character lookup.
pub trait CharacterSource: Send + Sync {
    fn character(&self, id: &CharacterId) -> Option<CharacterRecord>;
}
