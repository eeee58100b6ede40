//! Frame/version mechanics for one group's generated composite image.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ImageAsset;

/// Maximum number of superseded versions retained per group. The oldest
/// entry is evicted on overflow.
pub const MAX_FRAME_HISTORY: usize = 9;

/// Generation state for one group: the current composite image plus a
/// bounded history of superseded versions, most recent first.
///
/// The current asset is never a member of its own history; a history entry
/// is only created when an existing current asset is about to be replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Index of the owning group. Kept in step with the frame's position
    /// in the aggregate by the reorder engine.
    pub group_index: usize,

    /// Current composite image, absent if the group was never generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ImageAsset>,

    /// Superseded versions, most recent first, at most
    /// [`MAX_FRAME_HISTORY`] entries.
    #[serde(default)]
    pub history: Vec<ImageAsset>,
}

impl Frame {
    /// New frame with no generated image.
    pub fn new(group_index: usize) -> Self {
        Self {
            group_index,
            current: None,
            history: Vec::new(),
        }
    }

    /// Install a newly generated composite as the current asset.
    ///
    /// The previously current asset (if any) moves to the front of the
    /// history, evicting the oldest entry past [`MAX_FRAME_HISTORY`].
    /// Returns the superseded asset so callers can offer an immediate
    /// before/after comparison.
    pub fn install(&mut self, asset: ImageAsset) -> Option<ImageAsset> {
        let superseded = self.current.replace(asset);
        if let Some(prev) = &superseded {
            self.history.insert(0, prev.clone());
            self.history.truncate(MAX_FRAME_HISTORY);
        }
        superseded
    }

    /// Swap a history entry into the current slot.
    ///
    /// The old current asset moves to the front of the history and the
    /// chosen entry leaves its old position, so no asset is duplicated or
    /// dropped and the history length is unchanged.
    pub fn restore(&mut self, entry: &ImageAsset) -> Result<(), CoreError> {
        let Some(pos) = self.history.iter().position(|a| a == entry) else {
            return Err(CoreError::Validation(format!(
                "asset '{entry}' is not in the history of group {}",
                self.group_index
            )));
        };
        let Some(current) = self.current.take() else {
            return Err(CoreError::Validation(format!(
                "group {} has no current image to swap out",
                self.group_index
            )));
        };
        let chosen = self.history.remove(pos);
        self.history.insert(0, current);
        self.current = Some(chosen);
        debug_assert!(self.history.len() <= MAX_FRAME_HISTORY);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
