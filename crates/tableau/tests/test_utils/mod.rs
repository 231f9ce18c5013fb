//! Test utilities for tableau facade tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tableau::{
    GeneratedImage, GenerationError, GenerationErrorKind, ImageGeneration, ImageRequest,
    ImageResponse, StructuredGeneration, TableauResult, UploadedItem,
};

/// Structured service answering from a fixed sequence.
#[derive(Clone)]
pub struct ScriptedText {
    responses: Arc<Mutex<Vec<Result<Value, GenerationErrorKind>>>>,
}

impl ScriptedText {
    pub fn new(responses: Vec<Result<Value, GenerationErrorKind>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }
}

#[async_trait]
impl StructuredGeneration for ScriptedText {
    async fn generate_structured(&self, _prompt: &str, _schema: &Value) -> TableauResult<Value> {
        match self.responses.lock().unwrap().pop() {
            Some(Ok(value)) => Ok(value),
            Some(Err(kind)) => Err(GenerationError::new(kind).into()),
            None => Err(GenerationError::new(GenerationErrorKind::Service(
                "no scripted response left".to_string(),
            ))
            .into()),
        }
    }

    fn model_name(&self) -> &str {
        "scripted-text"
    }
}

/// Image service returning a PNG-typed image whose bytes are the prompt.
#[derive(Clone, Default)]
pub struct EchoImages;

#[async_trait]
impl ImageGeneration for EchoImages {
    async fn generate_image(&self, request: &ImageRequest) -> TableauResult<ImageResponse> {
        Ok(ImageResponse {
            image: Some(GeneratedImage {
                data: request.prompt().as_bytes().to_vec(),
                mime_type: "image/png".to_string(),
            }),
            safety_blocked: false,
        })
    }

    fn model_name(&self) -> &str {
        "echo-images"
    }
}

pub fn uploads() -> Vec<UploadedItem> {
    vec![
        UploadedItem::new("story.md", b"# Night Ferry\nMara crosses the bay.".to_vec()),
        UploadedItem::new("Mara.jpg", b"mara-photo".to_vec()),
    ]
}

/// A complete run: one scene with dialogue, one without.
pub fn ferry_run() -> Vec<Result<Value, GenerationErrorKind>> {
    vec![
        Ok(json!({
            "title": "Night Ferry",
            "logline": "A pilot crosses a dark bay.",
            "setting": "A harbor at night",
            "characters": ["Mara", "Otto"],
            "plot_points": ["The crossing"]
        })),
        Ok(json!({
            "title": "Night Ferry",
            "elements": [
                {"type": "scene_heading", "content": "EXT. BAY - NIGHT"},
                {"type": "action", "content": "Mara steers through fog."},
                {"type": "dialogue_block", "character": "Otto",
                 "elements": [{"type": "dialogue", "content": "Lights ahead! Slow down."}]},
                {"type": "transition", "content": "CUT TO:"},
                {"type": "scene_heading", "content": "EXT. PIER - NIGHT"},
                {"type": "action", "content": "The ferry bumps the pier."}
            ]
        })),
        Ok(json!({
            "characters": [
                {"name": "Mara", "gender": "female"},
                {"name": "Otto", "gender": "male"}
            ]
        })),
        Ok(json!({
            "prompts": [
                {"scene_index": 1, "prompt": "Fog and a steering wheel", "characters": ["Mara"]},
                {"scene_index": 5, "prompt": "Ferry at the pier", "characters": ["Mara", "Otto"]}
            ]
        })),
        Ok(json!({"lines": [{"scene_index": 1, "text": "Lights!"}]})),
    ]
}
