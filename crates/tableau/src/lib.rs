//! Tableau - storyboards from story material
//!
//! Tableau turns uploaded story material (text files, character images, zip
//! archives) into a storyboard: a structured script, character portraits,
//! scene images chained for visual continuity, and short dialogue captions,
//! together with a step-by-step report of the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tableau::{GeminiClient, Pipeline, PipelineConfig, UploadedItem, package};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::load()?;
//!     let client = GeminiClient::new(config.text_model().clone(), config.image_model().clone())?;
//!     let mut pipeline = Pipeline::new(client.clone(), client, config);
//!
//!     let uploads = vec![UploadedItem::from_path("story.txt").await?];
//!     let artifacts = pipeline.run(uploads).await?;
//!     let entries = package::package(&artifacts)?;
//!     println!("{} archive entries", entries.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `tableau_core` - Script, character and image data types
//! - `tableau_interface` - Text and image generation traits
//! - `tableau_error` - Error types
//! - `tableau_models` - Gemini implementation of the generation traits
//! - `tableau_ingest` - Upload and zip ingestion
//! - `tableau_storage` - Zip and directory archive writers
//! - `tableau_pipeline` - The storyboard pipeline
//!
//! This crate re-exports everything and adds packaging, the slideshow
//! presentation model and logging setup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use tableau_core::*;
pub use tableau_error::*;
pub use tableau_ingest::*;
pub use tableau_interface::*;
pub use tableau_models::*;
pub use tableau_pipeline::*;
pub use tableau_storage::*;

pub mod observability;
pub mod package;
pub mod slideshow;
