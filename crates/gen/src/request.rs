//! Request types for the generation boundary.

use fableboard_core::types::ImageAsset;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Aspect ratio
// ---------------------------------------------------------------------------

/// Output aspect ratio requested from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    #[default]
    Landscape16x9,
    Portrait9x16,
    Square,
}

impl AspectRatio {
    /// Wire representation of the ratio.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape16x9 => "16:9",
            Self::Portrait9x16 => "9:16",
            Self::Square => "1:1",
        }
    }

    /// Parse a ratio string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "16:9" => Some(Self::Landscape16x9),
            "9:16" => Some(Self::Portrait9x16),
            "1:1" => Some(Self::Square),
            _ => None,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Quality tier
// ---------------------------------------------------------------------------

/// Quality/cost tier requested from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Draft,
    #[default]
    Standard,
    High,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Standard => "standard",
            Self::High => "high",
        }
    }

    /// Parse a tier string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "standard" => Some(Self::Standard),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reference attachments
// ---------------------------------------------------------------------------

/// Why a reference image is attached to a request.
///
/// Tags are ordered the way the composer emits them: scene reference,
/// continuity reference, group-wide character references, then shot-scoped
/// overrides. The composite tag is only used by panel refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceTag {
    /// The scene's reference image (group override or scene default).
    Scene,
    /// The previous group's current composite, biasing visual continuity.
    Continuity,
    /// A character's default reference, applying to the whole group.
    Character { name: String },
    /// A shot-scoped character reference override, applying to one panel.
    ShotCharacter { panel: usize, name: String },
    /// The group's current composite, attached for panel refinement.
    Composite,
}

/// One reference image attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub tag: ReferenceTag,
    pub asset: ImageAsset,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A fully formed generation request.
///
/// The reference ordering is deterministic for identical inputs; tests
/// rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub references: Vec<ReferenceImage>,
    pub aspect_ratio: AspectRatio,
    pub quality: QualityTier,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
