//! Generative service integrations for tableau.
//!
//! Currently a single backend is provided: [`GeminiClient`], which talks to
//! the Gemini `generateContent` REST endpoint for both structured text and
//! image generation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;

pub use gemini::{DEFAULT_BASE_URL, GeminiClient, extract_json};
