//! Storyboard domain events.
//!
//! The engine follows an explicit "mutate, then notify/persist" contract:
//! after every durable mutation it publishes a [`BoardEvent`] on the
//! [`EventBus`] so that UI layers and background observers can react
//! without any framework-coupled observation of the aggregate itself.

pub mod bus;

pub use bus::{BoardEvent, BoardEventKind, EventBus};
