//! In-memory store and library implementations.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use fableboard_core::collab::{CharacterRecord, CharacterSource, SceneRecord, SceneSource};
use fableboard_core::storyboard::Storyboard;
use fableboard_core::types::{CharacterId, SceneId, StoryboardId};

use crate::{StoreError, StoryboardStore};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`StoryboardStore`] keyed by storyboard id.
#[derive(Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<StoryboardId, Storyboard>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored storyboards.
    pub fn len(&self) -> usize {
        self.boards.read().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StoryboardStore for MemoryStore {
    async fn save(&self, board: &Storyboard) -> Result<(), StoreError> {
        self.boards
            .write()
            .map_err(|_| StoreError::Io("store lock poisoned".to_string()))?
            .insert(board.id.clone(), board.clone());
        Ok(())
    }

    async fn load(&self, id: &StoryboardId) -> Result<Option<Storyboard>, StoreError> {
        Ok(self
            .boards
            .read()
            .map_err(|_| StoreError::Io("store lock poisoned".to_string()))?
            .get(id)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// MemoryLibrary
// ---------------------------------------------------------------------------

/// In-memory scene and character library implementing both read-only
/// lookup traits.
#[derive(Default)]
pub struct MemoryLibrary {
    scenes: RwLock<HashMap<SceneId, SceneRecord>>,
    characters: RwLock<HashMap<CharacterId, CharacterRecord>>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_scene(&self, id: impl Into<SceneId>, record: SceneRecord) {
        self.scenes
            .write()
            .expect("library lock")
            .insert(id.into(), record);
    }

    pub fn insert_character(&self, id: impl Into<CharacterId>, record: CharacterRecord) {
        self.characters
            .write()
            .expect("library lock")
            .insert(id.into(), record);
    }
}

impl SceneSource for MemoryLibrary {
    fn scene(&self, id: &SceneId) -> Option<SceneRecord> {
        self.scenes.read().expect("library lock").get(id).cloned()
    }
}

impl CharacterSource for MemoryLibrary {
    fn character(&self, id: &CharacterId) -> Option<CharacterRecord> {
        self.characters
            .read()
            .expect("library lock")
            .get(id)
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
