//! Archive writers for finished storyboard artifacts.
//!
//! The pipeline hands over a list of `(relative path, contents)` entries;
//! a writer turns them into a single downloadable zip or a plain directory.
//! Every archive carries a `manifest.json` with the size and SHA-256 of
//! each entry.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod entry;
mod manifest;
mod writer;
mod zip_writer;

pub use directory::DirectoryWriter;
pub use entry::{ArchiveEntry, EntryContents, validate_path};
pub use manifest::{MANIFEST_PATH, Manifest, ManifestEntry};
pub use writer::{ArchiveWriter, WrittenArchive};
pub use zip_writer::ZipArchiveWriter;
