//! Uploaded items and the concurrent ingestion entry point.

use crate::archive::expand_zip;
use crate::classify::{FileKind, classify_name, file_stem};
use crate::material::{ImageBlob, Ingested, IngestedMaterial, TextBlob};
use derive_getters::Getters;
use futures::future::join_all;
use std::path::Path;
use tableau_error::{IngestionError, IngestionErrorKind, TableauResult};
use tracing::{debug, info, instrument, warn};

/// One uploaded file: a name and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct UploadedItem {
    /// File name as uploaded
    name: String,
    /// Raw contents
    bytes: Vec<u8>,
}

impl UploadedItem {
    /// Create an item from a name and bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an item from disk, named by its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> TableauResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            IngestionError::new(IngestionErrorKind::UnreadableEntry {
                name: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(Self::new(name, bytes))
    }
}

/// Classify a single non-archive file by name and decode its contents.
///
/// `name` is the reported name, `path` the name used to infer the type and
/// the character name.
pub(crate) fn classify_bytes(name: String, path: &str, bytes: Vec<u8>) -> Ingested {
    match classify_name(path) {
        FileKind::Text => match String::from_utf8(bytes) {
            Ok(text) => Ingested::Text(TextBlob::new(name, text)),
            Err(e) => {
                let kind = IngestionErrorKind::UnreadableEntry {
                    name: name.clone(),
                    message: format!("not valid UTF-8: {}", e.utf8_error()),
                };
                Ingested::ignored(name, kind.to_string())
            }
        },
        FileKind::Image(_) if bytes.is_empty() => Ingested::ignored(name, "empty image file"),
        FileKind::Image(mime_type) => {
            Ingested::Image(ImageBlob::new(name, file_stem(path), bytes, mime_type))
        }
        FileKind::Hidden => Ingested::ignored(name, "hidden or OS metadata file"),
        FileKind::Archive | FileKind::Unsupported => Ingested::ignored(
            name,
            IngestionErrorKind::UnsupportedType(path.to_string()).to_string(),
        ),
    }
}

async fn process_item(item: UploadedItem) -> Vec<Ingested> {
    let UploadedItem { name, bytes } = item;
    if classify_name(&name) != FileKind::Archive {
        return vec![classify_bytes(name.clone(), &name, bytes)];
    }

    let archive_name = name.clone();
    let expanded =
        tokio::task::spawn_blocking(move || expand_zip(&archive_name, bytes)).await;
    match expanded {
        Ok(Ok(units)) => {
            debug!(archive = %name, entries = units.len(), "Expanded archive");
            units
        }
        Ok(Err(e)) => {
            warn!(archive = %name, error = %e, "Archive could not be opened");
            vec![Ingested::ignored(name, e.kind.to_string())]
        }
        Err(e) => {
            let kind = IngestionErrorKind::Archive {
                name: name.clone(),
                message: e.to_string(),
            };
            warn!(archive = %name, error = %kind, "Archive expansion task failed");
            vec![Ingested::ignored(name, kind.to_string())]
        }
    }
}

/// Ingest a batch of uploads.
///
/// Every item is processed concurrently; results are merged in upload
/// order (archive entries in archive order) so the outcome never depends
/// on completion timing. Ingestion failures are never fatal.
#[instrument(skip_all, fields(items = items.len()))]
pub async fn ingest(items: Vec<UploadedItem>) -> IngestedMaterial {
    let per_item = join_all(items.into_iter().map(process_item)).await;
    let material = IngestedMaterial::merge(per_item.into_iter().flatten());

    info!(
        texts = material.texts().len(),
        images = material.images().len(),
        ignored = material.ignored().len(),
        collisions = material.collisions().len(),
        "Ingestion complete"
    );
    for collision in material.collisions() {
        warn!(
            key = %collision.key,
            kept = %collision.kept,
            replaced = %collision.replaced,
            "Ingestion key collision"
        );
    }
    material
}
