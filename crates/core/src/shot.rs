//! Shot model and group partitioning.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{CharacterId, ImageAsset};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of shots per group.
///
/// A group is the atomic unit of image generation: all of its shots are
/// visualized together as the panels of one composite image.
pub const GROUP_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Shot
// ---------------------------------------------------------------------------

/// One authored camera instruction, the finest-grained editable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// 1-based id, contiguous across the whole storyboard at all times.
    pub id: u32,

    /// Optional camera/shot-scale tag, e.g. `"wide"` or `"close-up"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Free-text description of the action. May be empty.
    #[serde(default)]
    pub content: String,

    /// When locked, automated drafting must not alter `content`.
    #[serde(default)]
    pub locked: bool,

    /// Characters appearing in this shot. Empty means environment-only.
    #[serde(default)]
    pub characters: BTreeSet<CharacterId>,

    /// Per-character reference-image overrides applying to this shot only.
    /// A character without an entry uses its library default reference.
    #[serde(default)]
    pub image_overrides: BTreeMap<CharacterId, ImageAsset>,
}

impl Shot {
    /// New unlocked shot with empty content and no characters.
    pub fn empty(id: u32) -> Self {
        Self {
            id,
            theme: None,
            content: String::new(),
            locked: false,
            characters: BTreeSet::new(),
            image_overrides: BTreeMap::new(),
        }
    }

    /// Index of the group this shot belongs to.
    pub fn group_index(&self) -> usize {
        group_index_of(self.id)
    }

    /// 1-based panel position of this shot within its group.
    pub fn panel(&self) -> usize {
        (self.id as usize - 1) % GROUP_SIZE + 1
    }
}

/// Group index for a shot id. Always derived from the id, never stored.
pub fn group_index_of(shot_id: u32) -> usize {
    debug_assert!(shot_id >= 1, "shot ids are 1-based");
    (shot_id as usize - 1) / GROUP_SIZE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_index_for_first_group() {
        for id in 1..=4 {
            assert_eq!(group_index_of(id), 0);
        }
    }

    #[test]
    fn group_index_at_boundaries() {
        assert_eq!(group_index_of(4), 0);
        assert_eq!(group_index_of(5), 1);
        assert_eq!(group_index_of(8), 1);
        assert_eq!(group_index_of(9), 2);
    }

    #[test]
    fn panel_positions_cycle_within_group() {
        let panels: Vec<usize> = (1..=8).map(|id| Shot::empty(id).panel()).collect();
        assert_eq!(panels, vec![1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_shot_defaults() {
        let shot = Shot::empty(3);
        assert_eq!(shot.id, 3);
        assert!(shot.theme.is_none());
        assert!(shot.content.is_empty());
        assert!(!shot.locked);
        assert!(shot.characters.is_empty());
        assert!(shot.image_overrides.is_empty());
    }
}
