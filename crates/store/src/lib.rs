//! Persistence and library boundaries.
//!
//! The storyboard aggregate is persisted as an opaque put/get keyed by its
//! id; no query capability is required. [`memory`] provides in-memory
//! implementations of the store and of the scene/character lookup traits,
//! used by engine tests and usable as session caches.

pub mod memory;

use async_trait::async_trait;
use fableboard_core::storyboard::Storyboard;
use fableboard_core::types::StoryboardId;

pub use memory::{MemoryLibrary, MemoryStore};

/// Errors from the persistence collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(String),
}

/// Opaque storyboard persistence keyed by storyboard id.
///
/// `save` always writes the full serialized aggregate; overlapping saves
/// are last-write-wins and no partial-write merge is attempted.
#[async_trait]
pub trait StoryboardStore: Send + Sync {
    async fn save(&self, board: &Storyboard) -> Result<(), StoreError>;
    async fn load(&self, id: &StoryboardId) -> Result<Option<Storyboard>, StoreError>;
}
