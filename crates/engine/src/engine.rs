//! Stateful coordination of authoring edits, generation, refinement,
//! version restore, reordering, and batch drafting.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use fableboard_core::collab::{CharacterSource, SceneSource};
use fableboard_core::error::CoreError;
use fableboard_core::frame::Frame;
use fableboard_core::legacy::parse_shot_list;
use fableboard_core::reorder::{self, Direction};
use fableboard_core::shot::GROUP_SIZE;
use fableboard_core::storyboard::Storyboard;
use fableboard_core::types::{CharacterId, ImageAsset};
use fableboard_events::{BoardEvent, BoardEventKind, EventBus};
use fableboard_gen::compose::{
    compose_draft_prompt, compose_group_request, compose_refine_request, NarrativeContext,
};
use fableboard_gen::GenerationClient;
use fableboard_store::StoryboardStore;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::autosave;
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Result of a successful panel refinement: the refined composite plus
/// the asset it superseded, handed back so the caller can offer an
/// immediate before/after comparison without a separate fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineOutcome {
    pub refined: ImageAsset,
    pub superseded: ImageAsset,
}

struct EngineState {
    board: Storyboard,
    /// Groups with an outstanding generation call. A second call for such
    /// a group is rejected, not queued.
    in_flight: HashSet<usize>,
    /// Per-group generation epochs, bumped when a group is cleared or
    /// moved so a late-arriving result is recognized as stale and
    /// discarded instead of overwriting the changed group.
    epochs: HashMap<usize, u64>,
}

impl EngineState {
    fn epoch(&self, group: usize) -> u64 {
        self.epochs.get(&group).copied().unwrap_or(0)
    }

    fn bump_epoch(&mut self, group: usize) {
        *self.epochs.entry(group).or_insert(0) += 1;
    }
}

/// Stateful storyboard service.
///
/// The in-memory aggregate is the source of truth for the session. Every
/// durable mutation publishes a [`BoardEvent`] and, when autosave is
/// enabled, hands a full snapshot to the autosave coordinator. Generation
/// is single-flight per group; calls for different groups may be
/// outstanding concurrently, and each completion only mutates its own
/// group's frame.
///
/// The engine must be driven from within a Tokio runtime: autosave writes
/// are spawned onto it.
pub struct StoryboardEngine {
    state: Mutex<EngineState>,
    client: Arc<dyn GenerationClient>,
    store: Arc<dyn StoryboardStore>,
    scenes: Arc<dyn SceneSource>,
    characters: Arc<dyn CharacterSource>,
    narrative: NarrativeContext,
    bus: EventBus,
    config: EngineConfig,
}

impl StoryboardEngine {
    pub fn new(
        board: Storyboard,
        narrative: NarrativeContext,
        client: Arc<dyn GenerationClient>,
        store: Arc<dyn StoryboardStore>,
        scenes: Arc<dyn SceneSource>,
        characters: Arc<dyn CharacterSource>,
    ) -> Self {
        Self {
            state: Mutex::new(EngineState {
                board,
                in_flight: HashSet::new(),
                epochs: HashMap::new(),
            }),
            client,
            store,
            scenes,
            characters,
            narrative,
            bus: EventBus::default(),
            config: EngineConfig::default(),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribe to events published after each durable mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.bus.subscribe()
    }

    /// Full copy of the current aggregate.
    pub fn snapshot(&self) -> Storyboard {
        self.state().board.clone()
    }

    /// Copy of one group's frame, if it was ever generated.
    pub fn group_frame(&self, group: usize) -> Option<Frame> {
        self.state().board.frames.get(&group).cloned()
    }

    /// Whether a generation call is outstanding for the group.
    pub fn is_generating(&self, group: usize) -> bool {
        self.state().in_flight.contains(&group)
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // The guard is never held across an await; poisoning means a
        // panic mid-mutation, which is unrecoverable here.
        self.state.lock().expect("engine state poisoned")
    }

    /// Publish the event for a completed mutation and hand the snapshot
    /// to the autosave coordinator.
    fn commit(&self, snapshot: Storyboard, kind: BoardEventKind, group: Option<usize>) {
        let mut event = BoardEvent::new(kind, snapshot.id.clone());
        if let Some(group) = group {
            event = event.with_group(group);
        }
        self.bus.publish(event);
        if self.config.autosave {
            autosave::persist(Arc::clone(&self.store), self.bus.clone(), snapshot);
        }
    }

    // -----------------------------------------------------------------------
    // Authoring edits
    // -----------------------------------------------------------------------

    /// Append one empty group. Returns the new group index.
    pub fn append_group(&self) -> usize {
        let (snapshot, group) = {
            let mut state = self.state();
            let group = state.board.append_group();
            (state.board.clone(), group)
        };
        self.commit(snapshot, BoardEventKind::GroupAppended, Some(group));
        group
    }

    pub fn set_shot_theme(&self, index: usize, theme: Option<String>) -> Result<(), EngineError> {
        let snapshot = {
            let mut state = self.state();
            state.board.set_theme(index, theme)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::ShotEdited, None);
        Ok(())
    }

    /// Edit a shot's description. Returns `false` (and persists nothing)
    /// when the shot is locked.
    pub fn set_shot_content(
        &self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<bool, EngineError> {
        let snapshot = {
            let mut state = self.state();
            if !state.board.set_content(index, content)? {
                return Ok(false);
            }
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::ShotEdited, None);
        Ok(true)
    }

    /// Toggle a shot's lock flag, returning the new state.
    pub fn toggle_shot_lock(&self, index: usize) -> Result<bool, EngineError> {
        let (snapshot, locked) = {
            let mut state = self.state();
            let locked = state.board.toggle_lock(index)?;
            (state.board.clone(), locked)
        };
        self.commit(snapshot, BoardEventKind::ShotEdited, None);
        Ok(locked)
    }

    pub fn set_shot_characters(
        &self,
        index: usize,
        characters: BTreeSet<CharacterId>,
    ) -> Result<(), EngineError> {
        let snapshot = {
            let mut state = self.state();
            state.board.set_characters(index, characters)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::ShotEdited, None);
        Ok(())
    }

    pub fn set_shot_image_override(
        &self,
        index: usize,
        character: CharacterId,
        asset: ImageAsset,
    ) -> Result<(), EngineError> {
        let snapshot = {
            let mut state = self.state();
            state.board.set_image_override(index, character, asset)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::ShotEdited, None);
        Ok(())
    }

    pub fn clear_shot_image_override(
        &self,
        index: usize,
        character: &CharacterId,
    ) -> Result<(), EngineError> {
        let snapshot = {
            let mut state = self.state();
            state.board.clear_image_override(index, character)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::ShotEdited, None);
        Ok(())
    }

    pub fn set_scene_override(&self, group: usize, asset: ImageAsset) -> Result<(), EngineError> {
        let snapshot = {
            let mut state = self.state();
            state.board.set_scene_override(group, asset)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::SceneOverrideChanged, Some(group));
        Ok(())
    }

    /// Drop a group's scene override. Returns `false` when there was none.
    pub fn clear_scene_override(&self, group: usize) -> bool {
        let snapshot = {
            let mut state = self.state();
            if state.board.clear_scene_override(group).is_none() {
                return false;
            }
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::SceneOverrideChanged, Some(group));
        true
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Generate the composite image for one group. A single attempt: on
    /// failure the group's frame and history are left exactly as before
    /// and the typed failure is surfaced; the core never retries.
    pub async fn generate_group(&self, group: usize) -> Result<ImageAsset, EngineError> {
        let (request, epoch) = {
            let mut state = self.state();
            if state.in_flight.contains(&group) {
                return Err(EngineError::GenerationInFlight { group });
            }
            let request = compose_group_request(
                &state.board,
                group,
                &self.narrative,
                self.scenes.as_ref(),
                self.characters.as_ref(),
                self.config.aspect_ratio,
                self.config.quality,
            )?;
            state.in_flight.insert(group);
            (request, state.epoch(group))
        };

        let attempt = Uuid::new_v4();
        tracing::info!(
            group,
            attempt = %attempt,
            references = request.references.len(),
            "Submitting group generation",
        );
        let result = self.client.generate_image(request).await;

        let mut state = self.state();
        state.in_flight.remove(&group);
        let asset = match result {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!(group, attempt = %attempt, code = e.code(), "Group generation failed");
                return Err(e.into());
            }
        };
        if state.epoch(group) != epoch {
            tracing::warn!(
                group,
                attempt = %attempt,
                "Group changed while generating; discarding result",
            );
            return Err(EngineError::StaleGeneration { group });
        }
        state
            .board
            .frames
            .entry(group)
            .or_insert_with(|| Frame::new(group))
            .install(asset.clone());
        let snapshot = state.board.clone();
        drop(state);

        self.commit(snapshot, BoardEventKind::FrameGenerated, Some(group));
        Ok(asset)
    }

    /// Regenerate one panel of a group's composite, keeping the other
    /// panels identical. Requires an existing current image.
    pub async fn refine_panel(
        &self,
        group: usize,
        panel: usize,
        instruction: &str,
    ) -> Result<RefineOutcome, EngineError> {
        if !(1..=GROUP_SIZE).contains(&panel) {
            return Err(EngineError::PanelOutOfRange { panel });
        }

        let (request, epoch) = {
            let mut state = self.state();
            if state.in_flight.contains(&group) {
                return Err(EngineError::GenerationInFlight { group });
            }
            let Some(frame) = state.board.frames.get(&group).filter(|f| f.current.is_some())
            else {
                return Err(EngineError::NoFrame { group });
            };
            let request = compose_refine_request(
                frame,
                panel,
                instruction,
                self.config.aspect_ratio,
                self.config.quality,
            )?;
            state.in_flight.insert(group);
            (request, state.epoch(group))
        };

        let attempt = Uuid::new_v4();
        tracing::info!(group, panel, attempt = %attempt, "Submitting panel refinement");
        let result = self.client.generate_image(request).await;

        let mut state = self.state();
        state.in_flight.remove(&group);
        let refined = match result {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!(group, panel, attempt = %attempt, code = e.code(), "Panel refinement failed");
                return Err(e.into());
            }
        };
        if state.epoch(group) != epoch {
            return Err(EngineError::StaleGeneration { group });
        }
        let Some(frame) = state.board.frames.get_mut(&group) else {
            // The epoch guard keeps the frame alive while we were away.
            return Err(EngineError::NoFrame { group });
        };
        let superseded = frame.install(refined.clone()).ok_or_else(|| {
            EngineError::Core(CoreError::Internal(
                "refined a frame with no prior current image".to_string(),
            ))
        })?;
        let snapshot = state.board.clone();
        drop(state);

        self.commit(snapshot, BoardEventKind::PanelRefined, Some(group));
        Ok(RefineOutcome { refined, superseded })
    }

    /// Draft (or redraft) the group's shot descriptions via the text
    /// backend. Locked shots keep their content bit-for-bit. Returns the
    /// number of shots updated.
    pub async fn draft_group_content(&self, group: usize) -> Result<usize, EngineError> {
        let (prompt, epoch) = {
            let mut state = self.state();
            if state.in_flight.contains(&group) {
                return Err(EngineError::GenerationInFlight { group });
            }
            let prompt = compose_draft_prompt(&state.board, group, &self.narrative)?;
            state.in_flight.insert(group);
            (prompt, state.epoch(group))
        };

        tracing::info!(group, "Submitting content draft");
        let result = self.client.generate_text(prompt).await;

        let mut state = self.state();
        state.in_flight.remove(&group);
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(group, code = e.code(), "Content draft failed");
                return Err(e.into());
            }
        };
        if state.epoch(group) != epoch {
            return Err(EngineError::StaleGeneration { group });
        }
        let drafts = parse_shot_list(&text);
        let updated = state.board.apply_drafted_content(group, &drafts)?;
        let snapshot = state.board.clone();
        drop(state);

        self.commit(snapshot, BoardEventKind::ContentDrafted, Some(group));
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Versions
    // -----------------------------------------------------------------------

    /// Swap a history entry into the current slot; the displaced current
    /// asset joins the history, so nothing is lost.
    pub fn compare_and_restore(&self, group: usize, entry: &ImageAsset) -> Result<(), EngineError> {
        let snapshot = {
            let mut state = self.state();
            let Some(frame) = state.board.frames.get_mut(&group) else {
                return Err(EngineError::NoFrame { group });
            };
            frame.restore(entry)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::FrameRestored, Some(group));
        Ok(())
    }

    /// Reset a group's generation state, dropping its current image and
    /// history. Any outstanding generation result for the group will be
    /// discarded as stale. Returns `false` when there was nothing to clear.
    pub fn clear_frame(&self, group: usize) -> bool {
        let snapshot = {
            let mut state = self.state();
            state.bump_epoch(group);
            if state.board.frames.remove(&group).is_none() {
                return false;
            }
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::FrameCleared, Some(group));
        true
    }

    // -----------------------------------------------------------------------
    // Reordering
    // -----------------------------------------------------------------------

    /// Swap a group with its neighbour. Shots, frames, and scene overrides
    /// move as one unit. Returns `Ok(false)` for a move past either end.
    /// Rejected while either affected group has a generation in flight.
    pub fn move_group(&self, group: usize, direction: Direction) -> Result<bool, EngineError> {
        let snapshot = {
            let mut state = self.state();
            let count = state.board.group_count();
            if group >= count {
                return Err(EngineError::Core(CoreError::NotFound {
                    entity: "group",
                    id: group.to_string(),
                }));
            }
            let Some(target) = reorder::move_target(group, direction, count) else {
                return Ok(false);
            };
            for g in [group, target] {
                if state.in_flight.contains(&g) {
                    return Err(EngineError::GenerationInFlight { group: g });
                }
            }
            // Frames change owners; any result still in the pipe for these
            // indices must not land on the wrong group.
            state.bump_epoch(group);
            state.bump_epoch(target);
            reorder::move_group(&mut state.board, group, direction)?;
            state.board.clone()
        };
        self.commit(snapshot, BoardEventKind::GroupsMoved, None);
        Ok(true)
    }
}
