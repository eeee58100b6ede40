//! Generation boundary for the storyboard core.
//!
//! Defines the request shape handed to a generative backend, the typed
//! failure codes the engine branches on, the [`GenerationClient`] trait,
//! and the prompt composer that turns one storyboard group into a fully
//! formed request. The composer never calls the client; issuing the single
//! attempt is the engine's job.

pub mod client;
pub mod compose;
pub mod error;
pub mod request;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use request::{AspectRatio, GenerationRequest, QualityTier, ReferenceImage, ReferenceTag};
