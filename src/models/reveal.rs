use serde::{Deserialize, Serialize};

/// Whether the current fact is shown alone or together with its picture.
///
/// `ImageRevealed` is only reachable after an image was fetched for the
/// current fact. Starting a new fact always resets to `FactOnly`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    #[default]
    FactOnly,
    ImageRevealed,
}

/// Position in the fetch → reveal → feedback cycle.
///
/// - `Loading`: a fact request is in flight
/// - `FactShown`: a fact is displayed, an image may be requested
/// - `ImageLoading`: an image request is in flight
/// - `ImageShown`: the picture is revealed, advancing asks for feedback
/// - `Error`: the fact could not be loaded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    #[default]
    Loading,
    FactShown,
    ImageLoading,
    ImageShown,
    Error,
}

impl RevealState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::FactShown => "fact_shown",
            Self::ImageLoading => "image_loading",
            Self::ImageShown => "image_shown",
            Self::Error => "error",
        }
    }

    /// A fetch is outstanding; the render layer should disable triggers.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::ImageLoading)
    }
}
