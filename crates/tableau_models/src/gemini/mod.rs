//! Gemini REST backend.

mod client;
mod dto;
mod extract;

pub use client::{DEFAULT_BASE_URL, GeminiClient};
pub use extract::extract_json;
