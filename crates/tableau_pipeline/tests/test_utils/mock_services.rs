//! Mock generation services.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tableau_core::{GeneratedImage, ImageRequest, ImageResponse};
use tableau_error::{GenerationError, GenerationErrorKind, TableauResult};
use tableau_interface::{ImageGeneration, StructuredGeneration};

/// Structured service that answers from a fixed sequence.
///
/// Calls past the end of the sequence fail with a service error.
#[derive(Clone)]
pub struct MockTextService {
    responses: Vec<Result<Value, GenerationErrorKind>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockTextService {
    pub fn new_sequence(responses: Vec<Result<Value, GenerationErrorKind>>) -> Self {
        Self {
            responses,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in call order.
    #[allow(dead_code)]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredGeneration for MockTextService {
    async fn generate_structured(&self, prompt: &str, _schema: &Value) -> TableauResult<Value> {
        let index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        match self.responses.get(index) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(kind)) => Err(GenerationError::new(kind.clone()).into()),
            None => Err(GenerationError::new(GenerationErrorKind::Service(
                "mock sequence exhausted".to_string(),
            ))
            .into()),
        }
    }

    fn model_name(&self) -> &str {
        "mock-text"
    }
}

/// Canned image behaviour.
#[derive(Debug, Clone)]
pub enum MockImage {
    /// Return an image whose bytes are the request prompt
    Echo,
    /// No image, flagged by safety filtering
    Blocked,
    /// Image returned but the request was altered by safety filtering
    Altered,
    /// Fail with the given error
    Error(GenerationErrorKind),
}

/// What the image service was asked for.
#[derive(Debug, Clone)]
pub struct RecordedImageRequest {
    pub prompt: String,
    pub references: Vec<String>,
    pub continuity: Option<Vec<u8>>,
}

/// Image service matching prompts against substring rules.
///
/// The first rule whose needle occurs in the prompt decides the answer;
/// unmatched prompts get [`MockImage::Echo`].
#[derive(Clone, Default)]
pub struct MockImageService {
    rules: Vec<(String, MockImage)>,
    requests: Arc<Mutex<Vec<RecordedImageRequest>>>,
}

impl MockImageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, needle: impl Into<String>, behavior: MockImage) -> Self {
        self.rules.push((needle.into(), behavior));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedImageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The recorded request whose prompt contains `needle`.
    pub fn request_for(&self, needle: &str) -> Option<RecordedImageRequest> {
        self.requests()
            .into_iter()
            .find(|request| request.prompt.contains(needle))
    }
}

#[async_trait]
impl ImageGeneration for MockImageService {
    async fn generate_image(&self, request: &ImageRequest) -> TableauResult<ImageResponse> {
        self.requests.lock().unwrap().push(RecordedImageRequest {
            prompt: request.prompt().clone(),
            references: request.references().iter().map(|r| r.name.clone()).collect(),
            continuity: request.continuity().as_ref().map(|image| image.data.clone()),
        });

        let behavior = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt().contains(needle.as_str()))
            .map(|(_, behavior)| behavior.clone())
            .unwrap_or(MockImage::Echo);

        let echo = GeneratedImage {
            data: request.prompt().as_bytes().to_vec(),
            mime_type: "image/png".to_string(),
        };
        match behavior {
            MockImage::Echo => Ok(ImageResponse {
                image: Some(echo),
                safety_blocked: false,
            }),
            MockImage::Altered => Ok(ImageResponse {
                image: Some(echo),
                safety_blocked: true,
            }),
            MockImage::Blocked => Ok(ImageResponse {
                image: None,
                safety_blocked: true,
            }),
            MockImage::Error(kind) => Err(GenerationError::new(kind).into()),
        }
    }

    fn model_name(&self) -> &str {
        "mock-image"
    }
}
