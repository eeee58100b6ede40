//! Typed generation failures.

/// Errors returned by a generation backend.
///
/// The core performs no automatic retry on any of these; each generation
/// call is a single attempt initiated by an explicit user action, and its
/// result is surfaced as-is.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// The backend denied the request for permission or billing reasons.
    #[error("Permission denied by the generation backend")]
    PermissionDenied,

    /// The request was rejected by the backend's content policy.
    #[error("Request blocked by content policy")]
    PolicyBlocked,

    /// The backend rejected the request as malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Transient rejection; the user may re-invoke explicitly.
    #[error("Rate limited by the generation backend")]
    RateLimited,

    /// The call succeeded but the response carried no image.
    #[error("The generation backend returned no image")]
    NoImageReturned,

    /// Anything the backend did not classify.
    #[error("Generation failed: {0}")]
    Unknown(String),
}

impl GenerationError {
    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::PolicyBlocked => "policy_blocked",
            Self::BadRequest(_) => "bad_request",
            Self::RateLimited => "rate_limited",
            Self::NoImageReturned => "no_image_returned",
            Self::Unknown(_) => "unknown",
        }
    }
}
