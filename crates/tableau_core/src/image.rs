//! Image generation request and response types.

use derive_builder::Builder;
use derive_getters::Getters;

/// A reference image attached to an image generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    /// Label shown to the model, e.g. the character name
    pub name: String,
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: String,
}

/// Image generation request.
///
/// # Examples
///
/// ```
/// use tableau_core::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("A lighthouse at dusk")
///     .style("watercolor")
///     .aspect_ratio("16:9")
///     .build()
///     .unwrap();
///
/// assert!(request.references().is_empty());
/// assert!(request.continuity().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Image prompt
    prompt: String,
    /// Character references for fidelity
    #[builder(default)]
    references: Vec<ReferenceImage>,
    /// Previous scene image for visual continuity
    #[builder(default)]
    continuity: Option<ReferenceImage>,
    /// Visual style
    style: String,
    /// Aspect ratio, e.g. "16:9"
    aspect_ratio: String,
}

impl ImageRequest {
    /// Creates a new request builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// Encoded image returned by the image service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: String,
}

/// Image service response.
///
/// `image` may be absent even on a successful call; `safety_blocked` says
/// whether content-safety filtering altered or blocked the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageResponse {
    /// Generated image, if any
    pub image: Option<GeneratedImage>,
    /// Whether safety filtering intervened
    pub safety_blocked: bool,
}
