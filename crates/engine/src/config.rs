use fableboard_gen::{AspectRatio, QualityTier};

/// Engine configuration loaded from environment variables.
///
/// All fields have defaults suitable for interactive use.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Aspect ratio requested for generated composites.
    pub aspect_ratio: AspectRatio,
    /// Quality tier requested from the backend.
    pub quality: QualityTier,
    /// Whether durable mutations are persisted automatically.
    pub autosave: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            quality: QualityTier::default(),
            autosave: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `FABLEBOARD_ASPECT_RATIO` | `16:9`     |
    /// | `FABLEBOARD_QUALITY`      | `standard` |
    /// | `FABLEBOARD_AUTOSAVE`     | `true`     |
    pub fn from_env() -> Self {
        let aspect_ratio = match std::env::var("FABLEBOARD_ASPECT_RATIO") {
            Ok(value) => AspectRatio::from_str(&value)
                .expect("FABLEBOARD_ASPECT_RATIO must be one of: 16:9, 9:16, 1:1"),
            Err(_) => AspectRatio::default(),
        };

        let quality = match std::env::var("FABLEBOARD_QUALITY") {
            Ok(value) => QualityTier::from_str(&value)
                .expect("FABLEBOARD_QUALITY must be one of: draft, standard, high"),
            Err(_) => QualityTier::default(),
        };

        let autosave = std::env::var("FABLEBOARD_AUTOSAVE")
            .map(|value| value != "false" && value != "0")
            .unwrap_or(true);

        Self {
            aspect_ratio,
            quality,
            autosave,
        }
    }
}
