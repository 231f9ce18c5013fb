//! Archive manifest.

use crate::ArchiveEntry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tableau_error::{JsonError, TableauResult};

/// Reserved path of the manifest inside every archive.
pub const MANIFEST_PATH: &str = "manifest.json";

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Relative path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Lowercase hex SHA-256 of the contents
    pub sha256: String,
}

/// Listing of every entry in an archive, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Entries in write order
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest for the given entries.
    pub fn from_entries(entries: &[ArchiveEntry]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|entry| ManifestEntry {
                    path: entry.path.clone(),
                    size: entry.as_bytes().len() as u64,
                    sha256: compute_hash(entry.as_bytes()),
                })
                .collect(),
        }
    }

    /// Look up an entry by path.
    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> TableauResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| JsonError::serialize(MANIFEST_PATH, e).into())
    }

    /// Parse a manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a manifest.
    pub fn from_json(json: &str) -> TableauResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| JsonError::parse(MANIFEST_PATH, e).into())
    }
}

/// Compute SHA-256 hash of data.
pub(crate) fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
