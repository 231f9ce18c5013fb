//! Pipeline run command handler.

use std::path::{Path, PathBuf};
use tableau::package::{write_archive, write_failure_report};
use tableau::{GeminiClient, Pipeline, PipelineConfig, UploadedItem};

/// Options for one `tableau run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Uploaded files
    pub inputs: Vec<PathBuf>,
    /// Requested archive location
    pub output: PathBuf,
    /// Style override
    pub style: Option<String>,
    /// Scene aspect ratio override
    pub aspect_ratio: Option<String>,
    /// Scene cap override
    pub max_scenes: Option<usize>,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
}

impl RunOptions {
    /// Layer the command-line overrides over `config`.
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(style) = &self.style {
            config = config.with_style(style.clone());
        }
        if let Some(aspect_ratio) = &self.aspect_ratio {
            config = config.with_aspect_ratio(aspect_ratio.clone());
        }
        if let Some(max_scenes) = self.max_scenes {
            config = config.with_max_scene_images(max_scenes);
        }
        config
    }
}

/// Run the pipeline over the inputs and write the archive.
///
/// On a fatal pipeline failure the partial report is written next to the
/// requested output and the failure is returned.
pub async fn run_storyboard(options: &RunOptions) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let config = options.apply(PipelineConfig::load_with(options.config.as_deref())?);
    config.validate()?;

    let client = GeminiClient::new(config.text_model().clone(), config.image_model().clone())?
        .with_base_url(config.api_base_url().clone())
        .with_timeout(*config.request_timeout_secs())?;

    let mut uploads = Vec::with_capacity(options.inputs.len());
    for path in &options.inputs {
        uploads.push(UploadedItem::from_path(path).await?);
    }
    tracing::info!(
        uploads = uploads.len(),
        output = %options.output.display(),
        style = %config.style(),
        cap = config.max_scene_images(),
        "Starting storyboard run"
    );

    let mut pipeline = Pipeline::new(client.clone(), client, config);
    match pipeline.run(uploads).await {
        Ok(artifacts) => {
            let written = write_archive(&artifacts, &options.output).await?;
            print_summary(&artifacts, &written.location);
            Ok(written.location)
        }
        Err(failure) => {
            let report_path = write_failure_report(&options.output, &failure.report).await?;
            tracing::error!(
                stage = %failure.stage,
                report = %report_path.display(),
                "Storyboard run failed"
            );
            eprintln!("{}", failure.report.render());
            eprintln!("Report written to {}", report_path.display());
            Err(Box::new(failure))
        }
    }
}

fn print_summary(artifacts: &tableau::GenerationArtifacts, location: &Path) {
    println!("{}", artifacts.script().title());
    println!("  scenes:    {}", artifacts.scene_images().len());
    println!("  portraits: {}", artifacts.portraits().len());
    println!("  dialogue:  {}", artifacts.dialogue().len());
    if !artifacts.skipped_for_capacity().is_empty() {
        println!("  skipped for capacity: {:?}", artifacts.skipped_for_capacity());
    }
    if !artifacts.safety_flagged_scenes().is_empty() {
        println!("  safety flagged scenes: {:?}", artifacts.safety_flagged_scenes());
    }
    println!("Written to {}", location.display());
}
