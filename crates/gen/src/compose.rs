//! Prompt composition.
//!
//! Turns one storyboard group into a [`GenerationRequest`]: narrative
//! context plus per-shot annotations in the prompt, and reference images
//! attached in a deterministic order (scene reference, continuity
//! reference, group-wide character references, shot-scoped overrides).
//! Identical inputs always yield an identical request shape.

use std::collections::BTreeSet;

use fableboard_core::collab::{CharacterSource, SceneSource};
use fableboard_core::error::CoreError;
use fableboard_core::frame::Frame;
use fableboard_core::shot::{Shot, GROUP_SIZE};
use fableboard_core::storyboard::Storyboard;
use fableboard_core::types::CharacterId;

use crate::request::{
    AspectRatio, GenerationRequest, QualityTier, ReferenceImage, ReferenceTag,
};

/// Opaque narrative framing for the whole storyboard: which universe,
/// story, and scene the shots belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrativeContext {
    pub universe_title: String,
    pub story_title: String,
    pub scene_title: String,
}

impl NarrativeContext {
    pub fn new(
        universe_title: impl Into<String>,
        story_title: impl Into<String>,
        scene_title: impl Into<String>,
    ) -> Self {
        Self {
            universe_title: universe_title.into(),
            story_title: story_title.into(),
            scene_title: scene_title.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Group generation
// ---------------------------------------------------------------------------

/// Compose the generation request for one group.
///
/// Refuses with a validation error when every shot in the group has empty
/// content; generation must not be attempted on an empty group.
pub fn compose_group_request(
    board: &Storyboard,
    group: usize,
    narrative: &NarrativeContext,
    scenes: &dyn SceneSource,
    characters: &dyn CharacterSource,
    aspect_ratio: AspectRatio,
    quality: QualityTier,
) -> Result<GenerationRequest, CoreError> {
    let shots = board.group_shots(group)?;
    if shots.iter().all(|s| s.content.trim().is_empty()) {
        return Err(CoreError::Validation(format!(
            "group {group} has no shot descriptions; write at least one before generating"
        )));
    }

    let prompt = group_prompt(board, shots, narrative, characters);
    let mut references = Vec::new();

    // 1. Scene reference: group override, else the linked scene's default.
    let scene_ref = board.scene_overrides.get(&group).cloned().or_else(|| {
        board
            .scene_id
            .as_ref()
            .and_then(|id| scenes.scene(id))
            .and_then(|record| record.default_reference)
    });
    if let Some(asset) = scene_ref {
        references.push(ReferenceImage {
            tag: ReferenceTag::Scene,
            asset,
        });
    }

    // 2. Continuity reference: the previous group's current composite.
    if group > 0 {
        if let Some(asset) = board
            .frames
            .get(&(group - 1))
            .and_then(|frame| frame.current.clone())
        {
            references.push(ReferenceImage {
                tag: ReferenceTag::Continuity,
                asset,
            });
        }
    }

    // 3. Group-wide character references, sorted by character id. A
    //    character gets one only if it appears in at least one shot
    //    without a shot-level override for it.
    let group_cast: BTreeSet<&CharacterId> =
        shots.iter().flat_map(|s| s.characters.iter()).collect();
    for id in &group_cast {
        let uses_default = shots
            .iter()
            .any(|s| s.characters.contains(*id) && !s.image_overrides.contains_key(*id));
        if !uses_default {
            continue;
        }
        if let Some(asset) = characters
            .character(id)
            .and_then(|record| record.default_reference)
        {
            references.push(ReferenceImage {
                tag: ReferenceTag::Character {
                    name: character_name(characters, id),
                },
                asset,
            });
        }
    }

    // 4. Shot-scoped overrides, in (panel, character id) order.
    for shot in shots {
        for (id, asset) in &shot.image_overrides {
            if !shot.characters.contains(id) {
                continue;
            }
            references.push(ReferenceImage {
                tag: ReferenceTag::ShotCharacter {
                    panel: shot.panel(),
                    name: character_name(characters, id),
                },
                asset: asset.clone(),
            });
        }
    }

    Ok(GenerationRequest {
        prompt,
        references,
        aspect_ratio,
        quality,
    })
}

fn group_prompt(
    board: &Storyboard,
    shots: &[Shot],
    narrative: &NarrativeContext,
    characters: &dyn CharacterSource,
) -> String {
    let mut prompt = String::new();
    for (label, value) in [
        ("Universe", &narrative.universe_title),
        ("Story", &narrative.story_title),
        ("Scene", &narrative.scene_title),
    ] {
        if !value.trim().is_empty() {
            prompt.push_str(&format!("{label}: {}\n", value.trim()));
        }
    }
    if !board.scene_summary.trim().is_empty() {
        prompt.push_str(&format!("Summary: {}\n", board.scene_summary.trim()));
    }
    prompt.push_str(&format!(
        "\nDraw one storyboard image composed of {GROUP_SIZE} numbered panels, one per shot:\n"
    ));
    for shot in shots {
        prompt.push_str(&shot_line(shot, characters));
        prompt.push('\n');
    }
    prompt
}

fn shot_line(shot: &Shot, characters: &dyn CharacterSource) -> String {
    let mut line = format!("Panel {}", shot.panel());
    if let Some(theme) = &shot.theme {
        line.push_str(&format!(" [{theme}]"));
    }
    if shot.characters.is_empty() {
        line.push_str(" (environment only)");
    } else {
        let names: Vec<String> = shot
            .characters
            .iter()
            .map(|id| character_name(characters, id))
            .collect();
        line.push_str(&format!(" ({})", names.join(", ")));
    }
    line.push_str(": ");
    line.push_str(shot.content.trim());
    line
}

/// Display name for a character, falling back to the raw id when the
/// library has no record.
fn character_name(characters: &dyn CharacterSource, id: &CharacterId) -> String {
    characters
        .character(id)
        .map(|record| record.name)
        .unwrap_or_else(|| id.clone())
}

// ---------------------------------------------------------------------------
// Panel refinement
// ---------------------------------------------------------------------------

/// Compose the request that refines one panel of an existing composite.
///
/// The current composite is attached as the sole reference; the prompt
/// constrains the backend so panels other than `panel` stay identical.
pub fn compose_refine_request(
    frame: &Frame,
    panel: usize,
    instruction: &str,
    aspect_ratio: AspectRatio,
    quality: QualityTier,
) -> Result<GenerationRequest, CoreError> {
    if !(1..=GROUP_SIZE).contains(&panel) {
        return Err(CoreError::Validation(format!(
            "panel {panel} is out of range; panels are numbered 1 to {GROUP_SIZE}"
        )));
    }
    if instruction.trim().is_empty() {
        return Err(CoreError::Validation(
            "refinement instruction must not be empty".to_string(),
        ));
    }
    let Some(current) = frame.current.clone() else {
        return Err(CoreError::Validation(format!(
            "group {} has no generated image; nothing to refine",
            frame.group_index
        )));
    };

    let prompt = format!(
        "Edit the attached {GROUP_SIZE}-panel storyboard image. Only panel {panel} may \
         change; every other panel must remain identical to the attachment.\n\
         Change to panel {panel}: {}",
        instruction.trim()
    );

    Ok(GenerationRequest {
        prompt,
        references: vec![ReferenceImage {
            tag: ReferenceTag::Composite,
            asset: current,
        }],
        aspect_ratio,
        quality,
    })
}

// ---------------------------------------------------------------------------
// Batch content drafting
// ---------------------------------------------------------------------------

/// Compose the text prompt that asks the backend to (re)write one group's
/// shot descriptions.
///
/// The backend is instructed to answer in the numbered `N. [theme] content`
/// shot-line format so the reply parses with
/// [`fableboard_core::legacy::parse_shot_list`]. Locked shots are listed as
/// fixed; the engine discards any drafted replacement for them regardless.
pub fn compose_draft_prompt(
    board: &Storyboard,
    group: usize,
    narrative: &NarrativeContext,
) -> Result<String, CoreError> {
    let shots = board.group_shots(group)?;

    let mut prompt = String::new();
    for (label, value) in [
        ("Universe", &narrative.universe_title),
        ("Story", &narrative.story_title),
        ("Scene", &narrative.scene_title),
    ] {
        if !value.trim().is_empty() {
            prompt.push_str(&format!("{label}: {}\n", value.trim()));
        }
    }
    if !board.scene_summary.trim().is_empty() {
        prompt.push_str(&format!("Summary: {}\n", board.scene_summary.trim()));
    }
    prompt.push_str(&format!(
        "\nWrite shot descriptions for the following {GROUP_SIZE} storyboard panels. \
         Respond with exactly one line per panel in the form \
         `N. [camera tag] description`.\n"
    ));
    for shot in shots {
        let theme = shot.theme.as_deref().unwrap_or("any");
        let current = if shot.content.trim().is_empty() {
            "(empty)".to_string()
        } else {
            shot.content.trim().to_string()
        };
        if shot.locked {
            prompt.push_str(&format!(
                "{}. [{theme}] KEEP UNCHANGED: {current}\n",
                shot.panel()
            ));
        } else {
            prompt.push_str(&format!("{}. [{theme}] currently: {current}\n", shot.panel()));
        }
    }
    Ok(prompt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
