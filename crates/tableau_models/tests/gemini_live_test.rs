#![cfg(feature = "api")]

// Live Gemini tests. Run with `--features api` and GEMINI_API_KEY set.

use serde_json::json;
use tableau_core::ImageRequest;
use tableau_interface::{ImageGeneration, StructuredGeneration};
use tableau_models::GeminiClient;

fn client() -> anyhow::Result<GeminiClient> {
    let _ = dotenvy::dotenv();
    Ok(GeminiClient::new(
        "gemini-2.5-flash".to_string(),
        "gemini-2.5-flash-image".to_string(),
    )?)
}

#[tokio::test]
async fn test_structured_generation() -> anyhow::Result<()> {
    let client = client()?;
    let schema = json!({
        "type": "OBJECT",
        "properties": {"title": {"type": "STRING"}},
        "required": ["title"]
    });

    let value = client
        .generate_structured("Invent a title for a story about a lighthouse.", &schema)
        .await?;

    assert!(value["title"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_image_generation() -> anyhow::Result<()> {
    let client = client()?;
    let request = ImageRequest::builder()
        .prompt("A lighthouse on a cliff at dusk")
        .style("watercolor")
        .aspect_ratio("16:9")
        .build()?;

    let response = client.generate_image(&request).await?;

    assert!(response.image.is_some() || response.safety_blocked);
    Ok(())
}

#[tokio::test]
async fn test_invalid_key_is_authentication_failure() -> anyhow::Result<()> {
    let client = GeminiClient::with_api_key(
        "not-a-real-key".to_string(),
        "gemini-2.5-flash".to_string(),
        "gemini-2.5-flash-image".to_string(),
    )?;
    let schema = json!({"type": "OBJECT", "properties": {}});

    let err = client
        .generate_structured("hello", &schema)
        .await
        .expect_err("invalid key must fail");

    assert!(err.is_authentication());
    Ok(())
}
