//! Ingestion of uploaded reference material.
//!
//! Turns a batch of uploads (plain files and zip archives) into named text
//! blobs and named character image blobs. Anything that cannot be used lands
//! in an ignored list with a reason; ingestion never fails a run.
//!
//! Items are processed concurrently but merged in upload order, so the
//! result is deterministic. When two items map to the same normalized key
//! the later one wins and the overwrite is recorded as a [`KeyCollision`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod classify;
mod material;
mod upload;

pub use classify::{FileKind, IMAGE_EXTENSIONS, TEXT_EXTENSIONS, classify_name};
pub use material::{IgnoredItem, ImageBlob, IngestedMaterial, KeyCollision, TextBlob};
pub use upload::{UploadedItem, ingest};
