//! In-process event bus backed by a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use fableboard_core::types::StoryboardId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BoardEvent
// ---------------------------------------------------------------------------

/// What happened to a storyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEventKind {
    GroupAppended,
    ShotEdited,
    SceneOverrideChanged,
    FrameGenerated,
    PanelRefined,
    FrameRestored,
    FrameCleared,
    GroupsMoved,
    ContentDrafted,
    AutosaveFailed,
}

/// A domain event emitted after a storyboard mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    pub kind: BoardEventKind,
    pub storyboard_id: StoryboardId,

    /// The affected group, when the event is group-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_index: Option<usize>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl BoardEvent {
    /// Create a storyboard-scoped event.
    pub fn new(kind: BoardEventKind, storyboard_id: impl Into<StoryboardId>) -> Self {
        Self {
            kind,
            storyboard_id: storyboard_id.into(),
            group_index: None,
            timestamp: Utc::now(),
        }
    }

    /// Scope the event to one group.
    pub fn with_group(mut self, group_index: usize) -> Self {
        self.group_index = Some(group_index);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every published [`BoardEvent`]. Cloning the bus
/// clones the sender; all clones feed the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers the event reached. Publishing
    /// with no subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: BoardEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
