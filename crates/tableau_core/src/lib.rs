//! Core data types for the tableau storyboard pipeline.
//!
//! This crate provides the data model shared by ingestion, orchestration,
//! packaging and presentation: the script and its scene elements, character
//! references, generated scene images and dialogue lines.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod image;
mod scene;
mod script;
mod story;

pub use character::{AnalyzedCharacter, CharacterReference, ReferenceOrigin, ReferenceSet, reference_key};
pub use image::{GeneratedImage, ImageRequest, ImageRequestBuilder, ImageResponse, ReferenceImage};
pub use scene::{CohesivePrompt, DialogueLine, GeneratedSceneImage};
pub use script::{DialoguePart, DialoguePartKind, SceneElement, SceneElementKind, Script};
pub use story::StoryElements;
