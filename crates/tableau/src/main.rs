//! Tableau CLI binary.
//!
//! This binary provides command-line access to tableau's functionality:
//! - Run the storyboard pipeline and write an archive
//! - Inspect what ingestion makes of a set of uploads
//! - Preview a written storyboard as a slideshow

use clap::Parser;
use tableau::observability::{ObservabilityConfig, init_observability_with_config};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, RunOptions, describe_ingest, preview_archive, run_storyboard};

    // GEMINI_API_KEY may come from a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability_with_config(
        ObservabilityConfig::default()
            .with_verbose(cli.verbose)
            .with_json_logs(cli.json_logs),
    )?;

    match cli.command {
        Commands::Run {
            inputs,
            output,
            style,
            aspect_ratio,
            max_scenes,
            config,
        } => {
            let options = RunOptions {
                inputs,
                output,
                style,
                aspect_ratio,
                max_scenes,
                config,
            };
            run_storyboard(&options).await?;
        }

        Commands::Ingest { inputs, format } => {
            describe_ingest(&inputs, format).await?;
        }

        Commands::Preview { archive, seconds } => {
            preview_archive(&archive, seconds).await?;
        }
    }

    Ok(())
}
