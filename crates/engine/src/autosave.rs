//! Fire-and-forget persistence of the storyboard aggregate.
//!
//! Every durable mutation hands a full snapshot here. The save runs on a
//! spawned task so the caller never blocks; a failure is logged and
//! published as [`BoardEventKind::AutosaveFailed`] but never rolls back
//! the in-memory mutation that triggered it. Overlapping saves are
//! last-write-wins full snapshots.

use std::sync::Arc;

use fableboard_core::storyboard::Storyboard;
use fableboard_events::{BoardEvent, BoardEventKind, EventBus};
use fableboard_store::StoryboardStore;

/// Persist a snapshot in the background.
///
/// Must be called from within a Tokio runtime.
pub fn persist(store: Arc<dyn StoryboardStore>, bus: EventBus, board: Storyboard) {
    tokio::spawn(async move {
        match store.save(&board).await {
            Ok(()) => {
                tracing::debug!(storyboard_id = %board.id, "Storyboard autosaved");
            }
            Err(e) => {
                tracing::warn!(
                    storyboard_id = %board.id,
                    error = %e,
                    "Autosave failed; in-memory state remains authoritative",
                );
                bus.publish(BoardEvent::new(
                    BoardEventKind::AutosaveFailed,
                    board.id.clone(),
                ));
            }
        }
    });
}
