//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tableau - storyboards from story material
#[derive(Parser, Debug)]
#[command(name = "tableau")]
#[command(about = "Turn story material into a storyboard with continuity-chained scene images", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and write a storyboard archive
    Run {
        /// Text files, character images and zip archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output archive: a `.zip` file or a directory
        #[arg(short, long, default_value = "storyboard.zip")]
        output: PathBuf,

        /// Visual style for every image
        #[arg(long)]
        style: Option<String>,

        /// Aspect ratio for scene images (e.g., "16:9")
        #[arg(long)]
        aspect_ratio: Option<String>,

        /// Maximum number of scene images
        #[arg(long)]
        max_scenes: Option<usize>,

        /// Configuration file layered over the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show what ingestion makes of the inputs without calling any service
    Ingest {
        /// Text files, character images and zip archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Play a storyboard written to a directory as a slideshow
    Preview {
        /// Directory archive written by `tableau run --output <dir>`
        archive: PathBuf,

        /// Seconds each card stays on screen
        #[arg(long, default_value = "3")]
        seconds: u64,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
