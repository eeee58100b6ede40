//! The storyboard engine.
//!
//! Ties the pure domain core to its collaborators: the generation client,
//! the persistence store, the scene/character libraries, and the event
//! bus. All mutations follow the same contract: mutate the in-memory
//! aggregate, publish a [`fableboard_events::BoardEvent`], then hand a
//! full snapshot to the autosave coordinator. The in-memory aggregate is
//! always the source of truth for the running session; persistence
//! failures degrade durability, never correctness.

pub mod autosave;
pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{RefineOutcome, StoryboardEngine};
pub use error::EngineError;
