//! Error types for the tableau storyboard pipeline.
//!
//! This crate provides the error taxonomy shared by every tableau crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tableau_error::{TableauResult, GenerationError, GenerationErrorKind};
//!
//! fn call_service() -> TableauResult<String> {
//!     Err(GenerationError::new(GenerationErrorKind::Service("timeout".to_string())))?
//! }
//!
//! match call_service() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod http;
mod ingestion;
mod json;
mod pipeline;
mod storage;

pub use config::ConfigError;
pub use error::{TableauError, TableauErrorKind, TableauResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use http::HttpError;
pub use ingestion::{IngestionError, IngestionErrorKind};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use storage::{StorageError, StorageErrorKind};
