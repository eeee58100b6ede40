//! Storyboard aggregate: the unit of persistence and the root of all
//! shot, frame, and override state.
//!
//! A storyboard is always read and written as one serialized unit. It is
//! mutated exclusively through the operations defined here and in
//! [`crate::reorder`]; id contiguity and frame indexing are checked after
//! every mutation in debug builds.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::frame::Frame;
use crate::legacy::{parse_shot_list, ParsedShot};
use crate::shot::{Shot, GROUP_SIZE};
use crate::types::{CharacterId, ImageAsset, SceneId, StoryboardId};

/// The aggregate root for one storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    pub id: StoryboardId,
    pub title: String,

    /// Narrative summary of the scene being boarded.
    #[serde(default)]
    pub scene_summary: String,

    /// Cast for the whole storyboard.
    #[serde(default)]
    pub cast: BTreeSet<CharacterId>,

    /// Ordered shot list; ids are exactly `1..=N` at all times.
    pub shots: Vec<Shot>,

    /// Generated frames, sparse, keyed by group index.
    #[serde(default)]
    pub frames: BTreeMap<usize, Frame>,

    /// Per-group scene reference overrides, keyed by group index.
    #[serde(default)]
    pub scene_overrides: BTreeMap<usize, ImageAsset>,

    /// Linked scene record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<SceneId>,

    pub created_at: DateTime<Utc>,
}

impl Storyboard {
    /// New storyboard with one default group of unlocked, empty shots.
    pub fn new(id: impl Into<StoryboardId>, title: impl Into<String>) -> Self {
        let mut board = Self {
            id: id.into(),
            title: title.into(),
            scene_summary: String::new(),
            cast: BTreeSet::new(),
            shots: Vec::new(),
            frames: BTreeMap::new(),
            scene_overrides: BTreeMap::new(),
            scene_id: None,
            created_at: Utc::now(),
        };
        board.append_group();
        board
    }

    /// Upgrade a legacy plot-summary string into a structured storyboard.
    ///
    /// The summary is parsed with [`parse_shot_list`]; the final group is
    /// padded with empty shots so the shot count stays a multiple of
    /// [`GROUP_SIZE`]. A blank summary produces one default group.
    pub fn from_legacy_summary(
        id: impl Into<StoryboardId>,
        title: impl Into<String>,
        summary: &str,
    ) -> Self {
        let mut board = Self {
            id: id.into(),
            title: title.into(),
            scene_summary: summary.trim().to_string(),
            cast: BTreeSet::new(),
            shots: Vec::new(),
            frames: BTreeMap::new(),
            scene_overrides: BTreeMap::new(),
            scene_id: None,
            created_at: Utc::now(),
        };

        for parsed in parse_shot_list(summary) {
            let id = board.shots.len() as u32 + 1;
            let mut shot = Shot::empty(id);
            shot.theme = parsed.theme;
            shot.content = parsed.content;
            board.shots.push(shot);
        }
        while board.shots.is_empty() || board.shots.len() % GROUP_SIZE != 0 {
            let id = board.shots.len() as u32 + 1;
            board.shots.push(Shot::empty(id));
        }

        board.debug_check_invariants();
        board
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Number of groups. Always at least 1 for a well-formed storyboard.
    pub fn group_count(&self) -> usize {
        self.shots.len() / GROUP_SIZE
    }

    /// Append one group of unlocked, empty shots continuing the current
    /// maximum id. No generation is triggered. Returns the new group index.
    pub fn append_group(&mut self) -> usize {
        let next = self.shots.len() as u32 + 1;
        for offset in 0..GROUP_SIZE as u32 {
            self.shots.push(Shot::empty(next + offset));
        }
        self.debug_check_invariants();
        self.group_count() - 1
    }

    /// The shots of one group, in panel order.
    pub fn group_shots(&self, group: usize) -> Result<&[Shot], CoreError> {
        if group >= self.group_count() {
            return Err(CoreError::NotFound {
                entity: "group",
                id: group.to_string(),
            });
        }
        let start = group * GROUP_SIZE;
        Ok(&self.shots[start..start + GROUP_SIZE])
    }

    // -----------------------------------------------------------------------
    // Shot edits
    // -----------------------------------------------------------------------

    fn shot_mut(&mut self, index: usize) -> Result<&mut Shot, CoreError> {
        let len = self.shots.len();
        self.shots.get_mut(index).ok_or(CoreError::NotFound {
            entity: "shot",
            id: format!("index {index} of {len}"),
        })
    }

    /// Set a shot's camera/scale tag.
    pub fn set_theme(&mut self, index: usize, theme: Option<String>) -> Result<(), CoreError> {
        self.shot_mut(index)?.theme = theme;
        Ok(())
    }

    /// Set a shot's description.
    ///
    /// Returns `false` without touching the shot when it is locked; the
    /// edit is a no-op, not an error.
    pub fn set_content(
        &mut self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<bool, CoreError> {
        let shot = self.shot_mut(index)?;
        if shot.locked {
            return Ok(false);
        }
        shot.content = content.into();
        Ok(true)
    }

    /// Toggle a shot's lock flag, returning the new state.
    pub fn toggle_lock(&mut self, index: usize) -> Result<bool, CoreError> {
        let shot = self.shot_mut(index)?;
        shot.locked = !shot.locked;
        Ok(shot.locked)
    }

    /// Replace the set of characters appearing in a shot. Overrides for
    /// characters no longer in the shot are dropped.
    pub fn set_characters(
        &mut self,
        index: usize,
        characters: BTreeSet<CharacterId>,
    ) -> Result<(), CoreError> {
        let shot = self.shot_mut(index)?;
        shot.image_overrides.retain(|id, _| characters.contains(id));
        shot.characters = characters;
        Ok(())
    }

    /// Pin a specific reference image for one character in one shot.
    pub fn set_image_override(
        &mut self,
        index: usize,
        character: CharacterId,
        asset: ImageAsset,
    ) -> Result<(), CoreError> {
        let shot = self.shot_mut(index)?;
        if !shot.characters.contains(&character) {
            return Err(CoreError::Validation(format!(
                "character '{character}' does not appear in shot {}",
                shot.id
            )));
        }
        shot.image_overrides.insert(character, asset);
        Ok(())
    }

    /// Remove a shot's reference override for one character.
    pub fn clear_image_override(
        &mut self,
        index: usize,
        character: &CharacterId,
    ) -> Result<(), CoreError> {
        self.shot_mut(index)?.image_overrides.remove(character);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scene overrides
    // -----------------------------------------------------------------------

    /// Use a specific scene reference image for one group's generation.
    pub fn set_scene_override(&mut self, group: usize, asset: ImageAsset) -> Result<(), CoreError> {
        if group >= self.group_count() {
            return Err(CoreError::NotFound {
                entity: "group",
                id: group.to_string(),
            });
        }
        self.scene_overrides.insert(group, asset);
        Ok(())
    }

    /// Drop a group's scene override, reverting to the scene default.
    pub fn clear_scene_override(&mut self, group: usize) -> Option<ImageAsset> {
        self.scene_overrides.remove(&group)
    }

    // -----------------------------------------------------------------------
    // Drafted content
    // -----------------------------------------------------------------------

    /// Install drafted shot texts into one group.
    ///
    /// Drafts map positionally onto the group's shots; at most
    /// [`GROUP_SIZE`] drafts apply. Locked shots keep their content and
    /// theme bit-for-bit. Returns the number of shots updated.
    pub fn apply_drafted_content(
        &mut self,
        group: usize,
        drafts: &[ParsedShot],
    ) -> Result<usize, CoreError> {
        if group >= self.group_count() {
            return Err(CoreError::NotFound {
                entity: "group",
                id: group.to_string(),
            });
        }
        let start = group * GROUP_SIZE;
        let mut updated = 0;
        for (shot, draft) in self.shots[start..start + GROUP_SIZE]
            .iter_mut()
            .zip(drafts.iter())
        {
            if shot.locked {
                continue;
            }
            shot.content = draft.content.clone();
            if draft.theme.is_some() {
                shot.theme = draft.theme.clone();
            }
            updated += 1;
        }
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Structural invariants that must hold after every mutation. These are
    /// programming errors, not user-facing conditions, so they assert in
    /// debug builds rather than returning errors.
    pub(crate) fn debug_check_invariants(&self) {
        debug_assert!(
            !self.shots.is_empty() && self.shots.len() % GROUP_SIZE == 0,
            "shot count {} must be a positive multiple of {GROUP_SIZE}",
            self.shots.len()
        );
        debug_assert!(
            self.shots
                .iter()
                .enumerate()
                .all(|(i, s)| s.id as usize == i + 1),
            "shot ids must be contiguous from 1"
        );
        debug_assert!(
            self.frames.iter().all(|(g, f)| f.group_index == *g),
            "frame group_index must match its key"
        );
        debug_assert!(
            self.frames.keys().all(|g| *g < self.group_count()),
            "frames must not reference groups past the end"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
