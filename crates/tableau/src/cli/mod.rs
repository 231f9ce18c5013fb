//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the tableau binary.

mod commands;
mod ingest;
mod preview;
mod run;

pub use commands::{Cli, Commands, OutputFormat};
pub use ingest::describe_ingest;
pub use preview::preview_archive;
pub use run::{RunOptions, run_storyboard};
