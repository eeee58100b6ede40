//! Pure domain logic for the storyboard authoring core.
//!
//! This crate has zero internal dependencies (no async, no I/O, no client
//! bindings). It owns the shot model and group partitioning, the storyboard
//! aggregate, frame version mechanics, group reordering, the legacy
//! shot-list parser, and the read-only library lookup traits used by the
//! prompt composer.

pub mod collab;
pub mod error;
pub mod frame;
pub mod legacy;
pub mod reorder;
pub mod shot;
pub mod storyboard;
pub mod types;

pub use error::CoreError;
