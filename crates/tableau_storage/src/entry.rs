//! Archive entries and path rules.

use tableau_error::{StorageError, StorageErrorKind, TableauResult};

/// Entry payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContents {
    /// Binary payload, e.g. an image
    Bytes(Vec<u8>),
    /// UTF-8 text payload
    Text(String),
}

/// A single file destined for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Relative, `/`-separated path inside the archive
    pub path: String,
    /// Payload
    pub contents: EntryContents,
}

impl ArchiveEntry {
    /// Binary entry.
    pub fn bytes(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            contents: EntryContents::Bytes(bytes),
        }
    }

    /// Text entry.
    pub fn text(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: EntryContents::Text(text.into()),
        }
    }

    /// Payload as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.contents {
            EntryContents::Bytes(bytes) => bytes,
            EntryContents::Text(text) => text.as_bytes(),
        }
    }
}

/// Check that a path is a safe relative archive path.
///
/// Rejects empty paths, absolute paths, backslashes, and `.`/`..` or empty
/// components.
///
/// # Examples
///
/// ```
/// use tableau_storage::validate_path;
///
/// assert!(validate_path("scenes/scene_0003.png").is_ok());
/// assert!(validate_path("../escape.txt").is_err());
/// assert!(validate_path("/etc/passwd").is_err());
/// ```
pub fn validate_path(path: &str) -> TableauResult<()> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|component| component.is_empty() || component == "." || component == "..");
    if invalid {
        return Err(StorageError::new(StorageErrorKind::InvalidPath(path.to_string())).into());
    }
    Ok(())
}
