//! Archive writer trait and shared preparation.

use crate::entry::validate_path;
use crate::manifest::{MANIFEST_PATH, Manifest};
use crate::ArchiveEntry;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use tableau_error::{StorageError, StorageErrorKind, TableauResult};

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArchive {
    /// Where the archive was written (zip file or directory)
    pub location: PathBuf,
    /// Manifest of the written entries, excluding the manifest itself
    pub manifest: Manifest,
}

/// Writes a set of entries as one archive.
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    /// Write all entries plus a `manifest.json`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid or duplicate paths, or when the
    /// destination cannot be written. Path errors are detected before
    /// anything is written.
    async fn write(&self, entries: Vec<ArchiveEntry>) -> TableauResult<WrittenArchive>;

    /// Backend name (e.g., "zip", "directory").
    fn backend_name(&self) -> &'static str;
}

/// Validate entries and append the manifest entry.
pub(crate) fn prepare(mut entries: Vec<ArchiveEntry>) -> TableauResult<(Vec<ArchiveEntry>, Manifest)> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        validate_path(&entry.path)?;
        if entry.path == MANIFEST_PATH || !seen.insert(entry.path.as_str()) {
            return Err(StorageError::new(StorageErrorKind::PathCollision(entry.path.clone())).into());
        }
    }

    let manifest = Manifest::from_entries(&entries);
    entries.push(ArchiveEntry::text(MANIFEST_PATH, manifest.to_json()?));
    Ok((entries, manifest))
}
