//! Batch content drafting through the text backend.

mod common;

use assert_matches::assert_matches;
use common::{board_with_content, engine_with, ScriptedClient};
use fableboard_engine::EngineError;
use fableboard_gen::GenerationError;

#[tokio::test]
async fn drafted_lines_are_applied_in_panel_order() {
    let client = ScriptedClient::new();
    let (engine, _store) = engine_with(board_with_content(1), client.clone());

    client.push_text(
        "1. [wide] Ferry horn sounds across the bay\n\
         2. [close-up] Nia grips the railing\n\
         3. Gulls scatter from the pier\n\
         4. [aerial] The harbor shrinks below\n",
    );
    let updated = engine.draft_group_content(0).await.unwrap();
    assert_eq!(updated, 4);

    let board = engine.snapshot();
    assert_eq!(board.shots[0].content, "Ferry horn sounds across the bay");
    assert_eq!(board.shots[0].theme.as_deref(), Some("wide"));
    assert_eq!(board.shots[1].theme.as_deref(), Some("close-up"));
    assert_eq!(board.shots[2].content, "Gulls scatter from the pier");
    assert_eq!(board.shots[2].theme, None);
    assert_eq!(board.shots[3].theme.as_deref(), Some("aerial"));
}

#[tokio::test]
async fn locked_shots_survive_drafting_bit_for_bit() {
    let client = ScriptedClient::new();
    let (engine, _store) = engine_with(board_with_content(1), client.clone());

    engine.set_shot_content(1, "Hand-written beat").unwrap();
    engine.set_shot_theme(1, Some("macro".into())).unwrap();
    engine.toggle_shot_lock(1).unwrap();

    client.push_text(
        "1. Drafted one\n2. Drafted two\n3. Drafted three\n4. Drafted four\n",
    );
    let updated = engine.draft_group_content(0).await.unwrap();
    assert_eq!(updated, 3);

    let board = engine.snapshot();
    assert_eq!(board.shots[1].content, "Hand-written beat");
    assert_eq!(board.shots[1].theme.as_deref(), Some("macro"));
    assert_eq!(board.shots[0].content, "Drafted one");
    assert_eq!(board.shots[3].content, "Drafted four");

    // The prompt told the backend which panel is off limits.
    let prompt = client.text_prompts().pop().unwrap();
    assert!(prompt.contains("2. [macro] KEEP UNCHANGED: Hand-written beat"));
    assert!(prompt.contains("Tideworld"));
}

#[tokio::test]
async fn unstructured_draft_falls_back_to_a_single_shot() {
    let client = ScriptedClient::new();
    let (engine, _store) = engine_with(board_with_content(1), client.clone());

    client.push_text("A single paragraph with no numbering at all.");
    let updated = engine.draft_group_content(0).await.unwrap();
    assert_eq!(updated, 1);
    assert_eq!(
        engine.snapshot().shots[0].content,
        "A single paragraph with no numbering at all."
    );
    // The rest of the group keeps its prior content.
    assert_eq!(engine.snapshot().shots[1].content, "shot 2");
}

#[tokio::test]
async fn draft_failure_is_surfaced_and_changes_nothing() {
    let client = ScriptedClient::new();
    let (engine, _store) = engine_with(board_with_content(1), client.clone());

    let before = engine.snapshot();
    client.push_text_failure(GenerationError::PolicyBlocked);
    let err = engine.draft_group_content(0).await.unwrap_err();
    assert_matches!(err, EngineError::Generation(GenerationError::PolicyBlocked));
    assert_eq!(engine.snapshot(), before);
}
