//! Ingestion dry-run command handler.

use super::OutputFormat;
use serde_json::json;
use std::path::PathBuf;
use tableau::{UploadedItem, ingest};

/// Ingest the inputs and print what the pipeline would receive.
pub async fn describe_ingest(
    inputs: &[PathBuf],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut uploads = Vec::with_capacity(inputs.len());
    for path in inputs {
        uploads.push(UploadedItem::from_path(path).await?);
    }
    let material = ingest(uploads).await;

    match format {
        OutputFormat::Json => {
            let value = json!({
                "texts": material.texts().iter().map(|t| json!({
                    "name": t.name(),
                    "chars": t.text().chars().count(),
                })).collect::<Vec<_>>(),
                "images": material.images().iter().map(|i| json!({
                    "name": i.name(),
                    "character": i.character(),
                    "mime_type": i.mime_type(),
                    "bytes": i.bytes().len(),
                })).collect::<Vec<_>>(),
                "ignored": material.ignored(),
                "collisions": material.collisions(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Human => {
            println!("Text ({}):", material.texts().len());
            for text in material.texts() {
                println!("  {} ({} chars)", text.name(), text.text().chars().count());
            }
            println!("Character images ({}):", material.images().len());
            for image in material.images() {
                println!(
                    "  {} -> {} ({}, {} bytes)",
                    image.name(),
                    image.character(),
                    image.mime_type(),
                    image.bytes().len()
                );
            }
            if !material.ignored().is_empty() {
                println!("Ignored ({}):", material.ignored().len());
                for item in material.ignored() {
                    println!("  {}: {}", item.name, item.reason);
                }
            }
            for collision in material.collisions() {
                println!(
                    "Collision on '{}': {} replaced {}",
                    collision.key, collision.kept, collision.replaced
                );
            }
            if !material.has_text() {
                println!("No usable text: a run would stop at ingestion.");
            }
        }
    }
    Ok(())
}
