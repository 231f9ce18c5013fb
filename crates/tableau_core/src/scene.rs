//! Per-scene pipeline outputs.

use serde::{Deserialize, Serialize};

/// A generation-ready image prompt for one action element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohesivePrompt {
    /// Scene index of the action element
    pub scene_index: usize,
    /// Full image prompt
    pub prompt: String,
    /// Character names visible in the scene, as the prompt writer spelled them
    #[serde(default)]
    pub characters: Vec<String>,
}

/// A successfully generated scene image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSceneImage {
    /// Scene index of the action element
    pub scene_index: usize,
    /// Encoded image bytes
    pub image: Vec<u8>,
    /// MIME type of `image`
    pub mime_type: String,
    /// Prompt that produced the image
    pub prompt: String,
}

/// A dialogue line attached to a generated scene.
///
/// `is_duplicate` is true iff the source dialogue block was already used by
/// an earlier line in the same run; `occurrence` counts those earlier uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Scene index of the image this line accompanies
    pub scene_index: usize,
    /// Speaking character, uppercased
    pub character: String,
    /// Line text
    pub text: String,
    /// Scene index of the originating dialogue block
    pub source_element_index: usize,
    /// Whether the source block was already consumed earlier in the run
    pub is_duplicate: bool,
    /// Number of earlier lines that used the same source block
    pub occurrence: usize,
}
