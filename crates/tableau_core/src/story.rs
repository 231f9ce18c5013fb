//! Story analysis output.

use serde::{Deserialize, Serialize};

/// Story elements extracted from the reference text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryElements {
    /// Working title
    pub title: String,
    /// One-sentence summary
    #[serde(default)]
    pub logline: String,
    /// Where and when the story happens
    #[serde(default)]
    pub setting: String,
    /// Recurring themes
    #[serde(default)]
    pub themes: Vec<String>,
    /// Named characters
    #[serde(default)]
    pub characters: Vec<String>,
    /// Key beats in order
    #[serde(default)]
    pub plot_points: Vec<String>,
}
