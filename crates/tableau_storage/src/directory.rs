//! Plain directory archive writer.

use crate::manifest::{MANIFEST_PATH, Manifest, compute_hash};
use crate::writer::{ArchiveWriter, WrittenArchive, prepare};
use crate::ArchiveEntry;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tableau_error::{StorageError, StorageErrorKind, TableauResult};
use uuid::Uuid;

/// Writes entries as files under a root directory.
///
/// Each file is written to a temporary name and renamed into place, so a
/// reader never observes a half-written artifact.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    root: PathBuf,
}

impl DirectoryWriter {
    /// Create a writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_file(&self, entry: &ArchiveEntry) -> TableauResult<()> {
        let path = self.root.join(&entry.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, entry.as_bytes())
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    temp_path.display(),
                    e
                )))
            })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;
        Ok(())
    }

    /// Read the manifest of a previously written directory archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    pub async fn read_manifest(&self) -> TableauResult<Manifest> {
        let path = self.root.join(MANIFEST_PATH);
        let json = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Manifest::from_json(&json)
    }

    /// Read one entry and verify it against the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not listed, cannot be read, or its
    /// hash does not match.
    #[tracing::instrument(skip(self, manifest))]
    pub async fn read_entry(&self, manifest: &Manifest, path: &str) -> TableauResult<Vec<u8>> {
        let listed = manifest.get(path).ok_or_else(|| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{} is not listed in the manifest",
                path
            )))
        })?;

        let full_path = self.root.join(path);
        let data = tokio::fs::read(&full_path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                full_path.display(),
                e
            )))
        })?;

        let actual = compute_hash(&data);
        if actual != listed.sha256 {
            return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "Hash mismatch for {}: expected {}, got {}",
                path, listed.sha256, actual
            )))
            .into());
        }
        Ok(data)
    }
}

#[async_trait]
impl ArchiveWriter for DirectoryWriter {
    #[tracing::instrument(skip(self, entries), fields(root = %self.root.display(), entries = entries.len()))]
    async fn write(&self, entries: Vec<ArchiveEntry>) -> TableauResult<WrittenArchive> {
        let (entries, manifest) = prepare(entries)?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                self.root.display(),
                e
            )))
        })?;

        for entry in &entries {
            self.write_file(entry).await?;
            tracing::debug!(path = %entry.path, size = entry.as_bytes().len(), "Wrote archive entry");
        }

        tracing::info!(
            root = %self.root.display(),
            entries = manifest.entries.len(),
            "Wrote directory archive"
        );

        Ok(WrittenArchive {
            location: self.root.clone(),
            manifest,
        })
    }

    fn backend_name(&self) -> &'static str {
        "directory"
    }
}
