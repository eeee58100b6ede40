use fableboard_core::CoreError;
use fableboard_gen::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A generation call for this group is already outstanding; the new
    /// call is rejected, not queued.
    #[error("Group {group} already has a generation in flight")]
    GenerationInFlight { group: usize },

    /// The group has no generated image to refine or restore.
    #[error("Group {group} has no generated image")]
    NoFrame { group: usize },

    #[error("Panel {panel} is out of range")]
    PanelOutOfRange { panel: usize },

    /// The group was cleared or moved while its generation call was
    /// outstanding; the late result was discarded.
    #[error("Generation result for group {group} arrived after the group changed and was discarded")]
    StaleGeneration { group: usize },
}
