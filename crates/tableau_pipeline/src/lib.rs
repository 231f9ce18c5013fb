//! Storyboard pipeline orchestration for tableau.
//!
//! Turns uploaded story material into a storyboard: story analysis, a
//! structured script, character portraits, continuity-chained scene images
//! and dialogue captions, with an append-only report of every step.
//!
//! # Example
//!
//! ```rust,ignore
//! use tableau_models::GeminiClient;
//! use tableau_pipeline::{Pipeline, PipelineConfig};
//! use tableau_ingest::UploadedItem;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load()?;
//! let client = GeminiClient::new(config.text_model(), config.image_model())?;
//! let mut pipeline = Pipeline::new(client.clone(), client, config);
//!
//! let uploads = vec![UploadedItem::from_path("story.txt").await?];
//! let artifacts = pipeline.run(uploads).await?;
//! println!("{}", artifacts.report().render());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod continuity;
mod dialogue;
mod fallback;
mod matcher;
mod orchestrator;
pub mod prompts;
mod report;
mod resolver;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use continuity::{
    ChainState, ContinuityChain, SceneOutcome, ScenePlan, SceneSelection, select_scenes,
};
pub use dialogue::{Association, DuplicateTracker, associate};
pub use fallback::first_sentence;
pub use matcher::distance;
pub use orchestrator::{GenerationArtifacts, Pipeline, PipelineFailure};
pub use report::{EntryStatus, GenerationReport, ReportEntry, Stage};
pub use resolver::{
    DEFAULT_MATCH_THRESHOLD, ReferenceResolver, Resolution, SceneReferences, normalize,
};
