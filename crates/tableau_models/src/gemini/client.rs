//! Gemini `generateContent` client.

use super::dto::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
};
use super::extract::extract_json;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tableau_core::{GeneratedImage, ImageRequest, ImageResponse, ReferenceImage};
use tableau_error::{GenerationError, GenerationErrorKind, HttpError, TableauResult};
use tableau_interface::{ImageGeneration, StructuredGeneration};
use tracing::{debug, instrument, warn};

/// Default Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini client implementing both collaborator traits.
///
/// Structured calls go to the text model with a JSON response schema;
/// image calls go to the image model with `responseModalities = ["IMAGE"]`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Creates a client using `GEMINI_API_KEY` from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not set or the HTTP client cannot
    /// be initialized.
    #[instrument(skip_all, fields(text_model = %text_model, image_model = %image_model))]
    pub fn new(text_model: String, image_model: String) -> TableauResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::new(GenerationErrorKind::MissingApiKey))?;
        Self::with_api_key(api_key, text_model, image_model)
    }

    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client cannot be
    /// initialized.
    #[instrument(skip(api_key))]
    pub fn with_api_key(
        api_key: String,
        text_model: String,
        image_model: String,
    ) -> TableauResult<Self> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::MissingApiKey).into());
        }
        let client = build_http_client(DEFAULT_TIMEOUT_SECS)?;
        debug!("Created Gemini client");

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model,
            image_model,
        })
    }

    /// Override the API root (used for proxies and local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout_secs: u64) -> TableauResult<Self> {
        self.client = build_http_client(timeout_secs)?;
        Ok(self)
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    #[instrument(skip(self, request), fields(model = %model))]
    async fn send(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> TableauResult<GenerateContentResponse> {
        let url = self.endpoint(model);
        debug!(url = %url, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| HttpError::request(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::new(status_error(status, message)).into());
        }

        response.json::<GenerateContentResponse>().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::MalformedPayload(format!(
                "Failed to parse response: {}",
                e
            )))
            .into()
        })
    }
}

fn build_http_client(timeout_secs: u64) -> TableauResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)).into())
}

/// Map a non-success status to a generation error kind.
///
/// Gemini reports a rejected key as 400 `API_KEY_INVALID`, so that case is
/// classified as an authentication failure alongside 401 and 403.
fn status_error(status: StatusCode, message: String) -> GenerationErrorKind {
    let invalid_key = status == StatusCode::BAD_REQUEST
        && (message.contains("API_KEY_INVALID") || message.contains("API key not valid"));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerationErrorKind::Authentication(format!("HTTP {}: {}", status.as_u16(), message))
        }
        _ if invalid_key => {
            GenerationErrorKind::Authentication(format!("HTTP {}: {}", status.as_u16(), message))
        }
        _ => GenerationErrorKind::Http {
            status_code: status.as_u16(),
            message,
        },
    }
}

fn structured_request(prompt: &str, schema: &serde_json::Value) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(prompt)],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.clone()),
            ..GenerationConfig::default()
        }),
    }
}

fn image_request(request: &ImageRequest) -> GenerateContentRequest {
    let inline = |label: String, image: &ReferenceImage| {
        [
            Part::text(label),
            Part::inline(image.mime_type.clone(), STANDARD.encode(&image.data)),
        ]
    };

    let mut parts = Vec::new();
    for reference in request.references() {
        parts.extend(inline(
            format!("Reference image for the character \"{}\":", reference.name),
            reference,
        ));
    }
    // Continuity goes last among the images so it reads as the latest frame
    if let Some(previous) = request.continuity() {
        parts.extend(inline(
            "Previous scene, keep the visual continuity of this frame:".to_string(),
            previous,
        ));
    }
    parts.push(Part::text(format!(
        "{}\n\nStyle: {}",
        request.prompt(),
        request.style()
    )));

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: request.aspect_ratio().clone(),
            }),
            ..GenerationConfig::default()
        }),
    }
}

/// Turn a structured response into JSON.
fn parse_structured(response: &GenerateContentResponse) -> Result<serde_json::Value, GenerationErrorKind> {
    let text = response.text();
    if text.trim().is_empty() {
        return Err(match response.safety_reason() {
            Some(reason) => GenerationErrorKind::SafetyRejection(reason.to_string()),
            None => GenerationErrorKind::EmptyPayload("structured request".to_string()),
        });
    }

    let json = extract_json(&text).ok_or_else(|| {
        GenerationErrorKind::MalformedPayload(format!(
            "No JSON found in response (length: {})",
            text.len()
        ))
    })?;

    match serde_json::from_str::<serde_json::Value>(&json) {
        Ok(serde_json::Value::Null) => Err(GenerationErrorKind::EmptyPayload(
            "structured request".to_string(),
        )),
        Ok(value) => Ok(value),
        Err(e) => Err(GenerationErrorKind::MalformedPayload(e.to_string())),
    }
}

/// Turn an image response into an [`ImageResponse`].
fn parse_image(response: &GenerateContentResponse) -> Result<ImageResponse, GenerationErrorKind> {
    let safety_blocked = response.safety_reason().is_some();
    let image = match response.inline_image() {
        Some(inline) => Some(GeneratedImage {
            data: STANDARD
                .decode(inline.data.as_bytes())
                .map_err(|e| GenerationErrorKind::MalformedPayload(format!("Invalid image data: {}", e)))?,
            mime_type: inline.mime_type.clone(),
        }),
        None => None,
    };
    Ok(ImageResponse {
        image,
        safety_blocked,
    })
}

#[async_trait]
impl StructuredGeneration for GeminiClient {
    #[instrument(skip(self, prompt, schema), fields(model = %self.text_model, prompt_len = prompt.len()))]
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> TableauResult<serde_json::Value> {
        let request = structured_request(prompt, schema);
        let response = self.send(&self.text_model, &request).await?;
        parse_structured(&response).map_err(|kind| {
            warn!(error = %kind, "Unusable structured response");
            GenerationError::new(kind).into()
        })
    }

    fn model_name(&self) -> &str {
        &self.text_model
    }
}

#[async_trait]
impl ImageGeneration for GeminiClient {
    #[instrument(
        skip(self, request),
        fields(
            model = %self.image_model,
            references = request.references().len(),
            continuity = request.continuity().is_some()
        )
    )]
    async fn generate_image(&self, request: &ImageRequest) -> TableauResult<ImageResponse> {
        let body = image_request(request);
        let response = self.send(&self.image_model, &body).await?;
        let parsed = parse_image(&response).map_err(GenerationError::new)?;
        if parsed.safety_blocked {
            warn!(reason = ?response.safety_reason(), "Image request altered by safety filter");
        }
        Ok(parsed)
    }

    fn model_name(&self) -> &str {
        &self.image_model
    }
}
