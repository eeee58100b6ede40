//! Shared identifier aliases and the opaque image asset handle.

use serde::{Deserialize, Serialize};

/// Identifier of a character record in the character library.
pub type CharacterId = String;

/// Identifier of a scene record in the scene library.
pub type SceneId = String;

/// Identifier of a storyboard aggregate.
pub type StoryboardId = String;

/// Opaque reference to a stored image.
///
/// The core never interprets image data; it only attaches these handles to
/// generation requests and stores/evicts them in frame histories. Two
/// handles are equal exactly when they reference the same stored image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageAsset(pub String);

impl ImageAsset {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
