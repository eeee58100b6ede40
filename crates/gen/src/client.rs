//! The generation backend boundary.

use async_trait::async_trait;
use fableboard_core::types::ImageAsset;

use crate::error::GenerationError;
use crate::request::GenerationRequest;

/// A generative backend: given a structured prompt and optional reference
/// images, return one generated image or generated text, or fail with a
/// typed reason.
///
/// Implementations must not retry internally; the engine treats every call
/// as a single attempt whose outcome is stored or surfaced as-is.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate one composite image for the given request.
    async fn generate_image(
        &self,
        request: GenerationRequest,
    ) -> Result<ImageAsset, GenerationError>;

    /// Generate free text (used for batch shot drafting).
    async fn generate_text(&self, prompt: String) -> Result<String, GenerationError>;
}
