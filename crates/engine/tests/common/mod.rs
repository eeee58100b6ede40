//! Shared test doubles for engine integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fableboard_core::collab::{CharacterRecord, SceneRecord};
use fableboard_core::shot::GROUP_SIZE;
use fableboard_core::storyboard::Storyboard;
use fableboard_core::types::ImageAsset;
use fableboard_engine::StoryboardEngine;
use fableboard_gen::compose::NarrativeContext;
use fableboard_gen::{GenerationClient, GenerationError, GenerationRequest};
use fableboard_store::{MemoryLibrary, MemoryStore, StoreError, StoryboardStore};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// ScriptedClient
// ---------------------------------------------------------------------------

/// Generation client that pops pre-loaded results and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedClient {
    images: Mutex<VecDeque<Result<ImageAsset, GenerationError>>>,
    texts: Mutex<VecDeque<Result<String, GenerationError>>>,
    image_requests: Mutex<Vec<GenerationRequest>>,
    text_prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_image(&self, key: &str) {
        self.images
            .lock()
            .unwrap()
            .push_back(Ok(ImageAsset::new(key)));
    }

    pub fn push_image_failure(&self, err: GenerationError) {
        self.images.lock().unwrap().push_back(Err(err));
    }

    pub fn push_text(&self, text: &str) {
        self.texts.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn push_text_failure(&self, err: GenerationError) {
        self.texts.lock().unwrap().push_back(Err(err));
    }

    /// Every image request received, in call order.
    pub fn image_requests(&self) -> Vec<GenerationRequest> {
        self.image_requests.lock().unwrap().clone()
    }

    pub fn image_call_count(&self) -> usize {
        self.image_requests.lock().unwrap().len()
    }

    pub fn text_prompts(&self) -> Vec<String> {
        self.text_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate_image(
        &self,
        request: GenerationRequest,
    ) -> Result<ImageAsset, GenerationError> {
        self.image_requests.lock().unwrap().push(request);
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Unknown("no scripted image result".into())))
    }

    async fn generate_text(&self, prompt: String) -> Result<String, GenerationError> {
        self.text_prompts.lock().unwrap().push(prompt);
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Unknown("no scripted text result".into())))
    }
}

// ---------------------------------------------------------------------------
// GateClient
// ---------------------------------------------------------------------------

/// Client that parks image calls until the test releases them. Used for
/// single-flight and staleness tests.
pub struct GateClient {
    started: mpsc::UnboundedSender<()>,
    results: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<ImageAsset, GenerationError>>>,
}

impl GateClient {
    /// Returns the client, a receiver that fires once per call started,
    /// and a sender that releases one parked call per message.
    pub fn new() -> (
        Arc<Self>,
        mpsc::UnboundedReceiver<()>,
        mpsc::UnboundedSender<Result<ImageAsset, GenerationError>>,
    ) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                started: started_tx,
                results: tokio::sync::Mutex::new(release_rx),
            }),
            started_rx,
            release_tx,
        )
    }
}

#[async_trait]
impl GenerationClient for GateClient {
    async fn generate_image(
        &self,
        _request: GenerationRequest,
    ) -> Result<ImageAsset, GenerationError> {
        let _ = self.started.send(());
        self.results
            .lock()
            .await
            .recv()
            .await
            .unwrap_or_else(|| Err(GenerationError::Unknown("gate closed".into())))
    }

    async fn generate_text(&self, _prompt: String) -> Result<String, GenerationError> {
        Err(GenerationError::Unknown("gate client has no text".into()))
    }
}

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Store whose saves always fail, for autosave-failure tests.
pub struct FailingStore;

#[async_trait]
impl StoryboardStore for FailingStore {
    async fn save(&self, _board: &Storyboard) -> Result<(), StoreError> {
        Err(StoreError::Io("disk full".into()))
    }

    async fn load(
        &self,
        _id: &fableboard_core::types::StoryboardId,
    ) -> Result<Option<Storyboard>, StoreError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Library with one scene ("harbor") and two characters ("nia", "tomas").
pub fn library() -> Arc<MemoryLibrary> {
    let library = MemoryLibrary::new();
    library.insert_scene(
        "harbor",
        SceneRecord {
            default_reference: Some(ImageAsset::new("scene-main")),
            gallery: vec![("night".into(), ImageAsset::new("scene-night"))],
        },
    );
    library.insert_character(
        "nia",
        CharacterRecord {
            name: "Nia".into(),
            default_reference: Some(ImageAsset::new("nia-default")),
            gallery: vec![("armor".into(), ImageAsset::new("img-7"))],
        },
    );
    library.insert_character(
        "tomas",
        CharacterRecord {
            name: "Tomas".into(),
            default_reference: Some(ImageAsset::new("tomas-default")),
            gallery: vec![],
        },
    );
    Arc::new(library)
}

/// Storyboard with `groups` groups, every shot pre-filled with content.
pub fn board_with_content(groups: usize) -> Storyboard {
    let mut board = Storyboard::new("sb-1", "Harbor at dawn");
    for _ in 1..groups {
        board.append_group();
    }
    for i in 0..groups * GROUP_SIZE {
        board.set_content(i, format!("shot {}", i + 1)).unwrap();
    }
    board
}

pub fn narrative() -> NarrativeContext {
    NarrativeContext::new("Tideworld", "The Last Ferry", "Harbor at dawn")
}

/// Install a fmt subscriber once so `RUST_LOG=debug cargo test` shows
/// engine tracing. Repeat calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Engine over `board` with the given client and a fresh in-memory store.
pub fn engine_with(
    board: Storyboard,
    client: Arc<dyn GenerationClient>,
) -> (Arc<StoryboardEngine>, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let lib = library();
    let engine = StoryboardEngine::new(
        board,
        narrative(),
        client,
        store.clone(),
        lib.clone(),
        lib,
    );
    (Arc::new(engine), store)
}
