//! Collaborator traits for text and image generation.

use async_trait::async_trait;
use tableau_core::{ImageRequest, ImageResponse};
use tableau_error::TableauResult;

/// A service that turns a prompt into JSON matching a response schema.
///
/// An empty or absent payload must be reported as an error, never as
/// `Ok(Value::Null)`.
#[async_trait]
pub trait StructuredGeneration: Send + Sync {
    /// Generate a JSON value for `prompt` constrained by `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> TableauResult<serde_json::Value>;

    /// Model identifier (e.g., "gemini-2.5-flash").
    fn model_name(&self) -> &str;
}

/// A service that renders an image from a prompt and reference images.
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    /// Generate an image.
    ///
    /// A response without an image is not an error at this level; the
    /// caller decides how to treat it. `safety_blocked` reports whether
    /// content filtering intervened.
    async fn generate_image(&self, request: &ImageRequest) -> TableauResult<ImageResponse>;

    /// Model identifier (e.g., "gemini-2.5-flash-image").
    fn model_name(&self) -> &str;
}
