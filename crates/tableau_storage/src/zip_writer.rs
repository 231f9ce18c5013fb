//! Single-file zip archive writer.

use crate::writer::{ArchiveWriter, WrittenArchive, prepare};
use crate::ArchiveEntry;
use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tableau_error::{StorageError, StorageErrorKind, TableauResult};
use uuid::Uuid;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Writes entries into one deflate-compressed `.zip` file.
///
/// The archive is assembled in memory on the blocking pool, written to a
/// temporary sibling file and renamed into place.
#[derive(Debug, Clone)]
pub struct ZipArchiveWriter {
    destination: PathBuf,
}

impl ZipArchiveWriter {
    /// Create a writer targeting `destination`.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// Target file.
    pub fn destination(&self) -> &PathBuf {
        &self.destination
    }
}

fn build_zip(entries: &[ArchiveEntry]) -> Result<Vec<u8>, StorageError> {
    let archive_error = |e: &dyn std::fmt::Display| {
        StorageError::new(StorageErrorKind::Archive(e.to_string()))
    };
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        writer
            .start_file(entry.path.as_str(), options)
            .map_err(|e| archive_error(&e))?;
        writer
            .write_all(entry.as_bytes())
            .map_err(|e| archive_error(&e))?;
    }

    let cursor = writer.finish().map_err(|e| archive_error(&e))?;
    Ok(cursor.into_inner())
}

#[async_trait]
impl ArchiveWriter for ZipArchiveWriter {
    #[tracing::instrument(skip(self, entries), fields(destination = %self.destination.display(), entries = entries.len()))]
    async fn write(&self, entries: Vec<ArchiveEntry>) -> TableauResult<WrittenArchive> {
        let (entries, manifest) = prepare(entries)?;

        let bytes = tokio::task::spawn_blocking(move || build_zip(&entries))
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Archive(e.to_string())))??;

        if let Some(parent) = self.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self
            .destination
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, &bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.destination).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                self.destination.display(),
                e
            )))
            .into());
        }

        tracing::info!(
            path = %self.destination.display(),
            size = bytes.len(),
            entries = manifest.entries.len(),
            "Wrote zip archive"
        );

        Ok(WrittenArchive {
            location: self.destination.clone(),
            manifest,
        })
    }

    fn backend_name(&self) -> &'static str {
        "zip"
    }
}
