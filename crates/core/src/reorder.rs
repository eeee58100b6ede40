//! Group reordering.
//!
//! Moving a group swaps shots, frames (history included), and scene
//! overrides as one logical unit; shot ids are renumbered to stay
//! contiguous. Everything happens under a single `&mut` borrow with no
//! intermediate observable state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::shot::GROUP_SIZE;
use crate::storyboard::Storyboard;

/// Direction of a group move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Index of the neighbour a move would swap with, if any.
///
/// Returns `None` when the move would run past either end of the board.
pub fn move_target(group: usize, direction: Direction, group_count: usize) -> Option<usize> {
    match direction {
        Direction::Up => group.checked_sub(1),
        Direction::Down => {
            let target = group + 1;
            (target < group_count).then_some(target)
        }
    }
}

/// Swap a group with its neighbour in `direction`.
///
/// Returns `Ok(false)` for a move past either end (a no-op, not an error).
/// Otherwise swaps the two groups' shot blocks, frames, and scene
/// overrides; an override present in only one of the two groups migrates
/// to the other's new index.
pub fn move_group(
    board: &mut Storyboard,
    group: usize,
    direction: Direction,
) -> Result<bool, CoreError> {
    let groups = board.group_count();
    if group >= groups {
        return Err(CoreError::NotFound {
            entity: "group",
            id: group.to_string(),
        });
    }
    let Some(target) = move_target(group, direction, groups) else {
        return Ok(false);
    };

    // The two groups are adjacent; work on the lower index.
    let lower = group.min(target);
    let upper = lower + 1;

    // (a) Swap the shot blocks, then renumber every id to its position.
    let start = lower * GROUP_SIZE;
    for offset in 0..GROUP_SIZE {
        board.shots.swap(start + offset, start + GROUP_SIZE + offset);
    }
    for (i, shot) in board.shots.iter_mut().enumerate() {
        shot.id = (i + 1) as u32;
    }

    // (b) Swap the frames and fix their stored group index.
    let frame_lower = board.frames.remove(&lower);
    let frame_upper = board.frames.remove(&upper);
    if let Some(mut frame) = frame_lower {
        frame.group_index = upper;
        board.frames.insert(upper, frame);
    }
    if let Some(mut frame) = frame_upper {
        frame.group_index = lower;
        board.frames.insert(lower, frame);
    }

    // (c) Swap the scene overrides.
    let override_lower = board.scene_overrides.remove(&lower);
    let override_upper = board.scene_overrides.remove(&upper);
    if let Some(asset) = override_lower {
        board.scene_overrides.insert(upper, asset);
    }
    if let Some(asset) = override_upper {
        board.scene_overrides.insert(lower, asset);
    }

    board.debug_check_invariants();
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::types::ImageAsset;

    fn board_with_groups(groups: usize) -> Storyboard {
        let mut board = Storyboard::new("sb-1", "Board");
        for _ in 1..groups {
            board.append_group();
        }
        for (i, content) in (0..groups * GROUP_SIZE).map(|i| (i, format!("shot {}", i + 1))) {
            board.set_content(i, content).unwrap();
        }
        board
    }

    fn frame_with(group: usize, assets: &[&str]) -> Frame {
        let mut frame = Frame::new(group);
        for a in assets {
            frame.install(ImageAsset::new(*a));
        }
        frame
    }

    #[test]
    fn move_up_at_top_is_a_noop() {
        let mut board = board_with_groups(3);
        let before = board.clone();
        assert!(!move_group(&mut board, 0, Direction::Up).unwrap());
        assert_eq!(board, before);
    }

    #[test]
    fn move_down_at_bottom_is_a_noop() {
        let mut board = board_with_groups(3);
        let before = board.clone();
        assert!(!move_group(&mut board, 2, Direction::Down).unwrap());
        assert_eq!(board, before);
    }

    #[test]
    fn out_of_range_group_is_an_error() {
        let mut board = board_with_groups(2);
        assert!(move_group(&mut board, 5, Direction::Up).is_err());
    }

    #[test]
    fn move_down_swaps_shot_blocks_and_renumbers() {
        let mut board = board_with_groups(3);
        assert!(move_group(&mut board, 0, Direction::Down).unwrap());

        let contents: Vec<&str> = board.shots.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "shot 5", "shot 6", "shot 7", "shot 8", // former group 1
                "shot 1", "shot 2", "shot 3", "shot 4", // former group 0
                "shot 9", "shot 10", "shot 11", "shot 12",
            ]
        );
        let ids: Vec<u32> = board.shots.iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn frames_and_histories_travel_with_their_group() {
        let mut board = board_with_groups(2);
        board.frames.insert(0, frame_with(0, &["a1", "a2", "a3"]));
        assert!(move_group(&mut board, 0, Direction::Down).unwrap());

        assert!(!board.frames.contains_key(&0));
        let moved = board.frames.get(&1).unwrap();
        assert_eq!(moved.group_index, 1);
        assert_eq!(moved.current, Some(ImageAsset::new("a3")));
        assert_eq!(
            moved.history,
            vec![ImageAsset::new("a2"), ImageAsset::new("a1")]
        );
    }

    #[test]
    fn one_sided_scene_override_migrates() {
        let mut board = board_with_groups(2);
        board.set_scene_override(1, ImageAsset::new("ref-b")).unwrap();
        assert!(move_group(&mut board, 1, Direction::Up).unwrap());

        assert_eq!(
            board.scene_overrides.get(&0),
            Some(&ImageAsset::new("ref-b"))
        );
        assert!(!board.scene_overrides.contains_key(&1));
    }

    #[test]
    fn overrides_on_both_sides_swap() {
        let mut board = board_with_groups(2);
        board.set_scene_override(0, ImageAsset::new("ref-a")).unwrap();
        board.set_scene_override(1, ImageAsset::new("ref-b")).unwrap();
        assert!(move_group(&mut board, 0, Direction::Down).unwrap());

        assert_eq!(
            board.scene_overrides.get(&0),
            Some(&ImageAsset::new("ref-b"))
        );
        assert_eq!(
            board.scene_overrides.get(&1),
            Some(&ImageAsset::new("ref-a"))
        );
    }

    #[test]
    fn up_then_down_round_trips_bit_for_bit() {
        let mut board = board_with_groups(4);
        board.frames.insert(1, frame_with(1, &["b1", "b2"]));
        board.frames.insert(2, frame_with(2, &["c1"]));
        board.set_scene_override(2, ImageAsset::new("ref-c")).unwrap();
        board
            .set_characters(
                5,
                std::collections::BTreeSet::from(["nia".to_string()]),
            )
            .unwrap();
        board
            .set_image_override(5, "nia".into(), ImageAsset::new("img-7"))
            .unwrap();
        let before = board.clone();

        assert!(move_group(&mut board, 2, Direction::Up).unwrap());
        assert_ne!(board, before);
        assert!(move_group(&mut board, 1, Direction::Down).unwrap());
        assert_eq!(board, before);
    }

    #[test]
    fn move_target_boundaries() {
        assert_eq!(move_target(0, Direction::Up, 3), None);
        assert_eq!(move_target(1, Direction::Up, 3), Some(0));
        assert_eq!(move_target(2, Direction::Down, 3), None);
        assert_eq!(move_target(1, Direction::Down, 3), Some(2));
    }
}
