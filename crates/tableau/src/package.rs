//! Archive packaging for finished runs.
//!
//! Every artifact gets a deterministic path so that two packages of the
//! same run are identical apart from `run.json`'s timestamp:
//!
//! ```text
//! story.json
//! script.json
//! script.txt
//! characters.json
//! prompts.json
//! dialogue.json
//! report.txt
//! run.json
//! portraits/NN_<slug>.<ext>
//! scenes/scene_NNNN.<ext>
//! ```

use crate::slideshow::{Slide, Slideshow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tableau_core::{DialogueLine, Script};
use tableau_error::{JsonError, StorageError, StorageErrorKind, TableauResult};
use tableau_ingest::IgnoredItem;
use tableau_pipeline::{GenerationArtifacts, GenerationReport};
use tableau_storage::{ArchiveEntry, ArchiveWriter, DirectoryWriter, WrittenArchive, ZipArchiveWriter};
use tracing::{debug, info, instrument};

/// Path of the screenplay-formatted script.
pub const SCRIPT_TEXT_PATH: &str = "script.txt";
/// Path of the structured script.
pub const SCRIPT_JSON_PATH: &str = "script.json";
/// Path of the dialogue lines.
pub const DIALOGUE_PATH: &str = "dialogue.json";
/// Path of the rendered report.
pub const REPORT_PATH: &str = "report.txt";
/// Path of the run summary.
pub const SUMMARY_PATH: &str = "run.json";

/// Run-level metadata written alongside the artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Script title
    pub title: String,
    /// When the package was built
    pub generated_at: DateTime<Utc>,
    /// Scene indices with an image, ascending
    pub scenes: Vec<usize>,
    /// Eligible scenes beyond the cap
    pub skipped_for_capacity: Vec<usize>,
    /// Scenes flagged by safety filtering
    pub safety_flagged_scenes: Vec<usize>,
    /// Characters whose portrait was flagged by safety filtering
    pub safety_flagged_portraits: Vec<String>,
    /// Uploads that were not used
    pub ignored: Vec<IgnoredItem>,
}

/// File extension for an image MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

fn mime_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Lowercase, dash-separated form of a name for use in file names.
///
/// # Examples
///
/// ```
/// use tableau::package::slug;
///
/// assert_eq!(slug("Dr. Ada  Byron!"), "dr-ada-byron");
/// assert_eq!(slug("???"), "character");
/// ```
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "character".to_string()
    } else {
        slug.to_string()
    }
}

/// Archive path of a scene image.
pub fn scene_path(scene_index: usize, mime_type: &str) -> String {
    format!("scenes/scene_{:04}.{}", scene_index, extension_for(mime_type))
}

/// Archive path of the `position`-th portrait (zero-based).
pub fn portrait_path(position: usize, name: &str, mime_type: &str) -> String {
    format!(
        "portraits/{:02}_{}.{}",
        position + 1,
        slug(name),
        extension_for(mime_type)
    )
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> TableauResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| JsonError::serialize(what, e).into())
}

/// Turn a finished run into archive entries.
///
/// # Errors
///
/// Returns an error if an artifact cannot be serialized.
#[instrument(skip_all, fields(scenes = artifacts.scene_images().len()))]
pub fn package(artifacts: &GenerationArtifacts) -> TableauResult<Vec<ArchiveEntry>> {
    let script = artifacts.script();
    let summary = RunSummary {
        title: script.title().clone(),
        generated_at: Utc::now(),
        scenes: artifacts
            .scene_images()
            .iter()
            .map(|image| image.scene_index)
            .collect(),
        skipped_for_capacity: artifacts.skipped_for_capacity().clone(),
        safety_flagged_scenes: artifacts.safety_flagged_scenes().clone(),
        safety_flagged_portraits: artifacts.safety_flagged_portraits().clone(),
        ignored: artifacts.ignored().clone(),
    };

    let mut entries = vec![
        ArchiveEntry::text("story.json", to_json(artifacts.story(), "story")?),
        ArchiveEntry::text(SCRIPT_JSON_PATH, to_json(script, "script")?),
        ArchiveEntry::text(SCRIPT_TEXT_PATH, script.to_screenplay()),
        ArchiveEntry::text("characters.json", to_json(artifacts.characters(), "characters")?),
        ArchiveEntry::text("prompts.json", to_json(artifacts.cohesive_prompts(), "prompts")?),
        ArchiveEntry::text(DIALOGUE_PATH, to_json(artifacts.dialogue(), "dialogue")?),
        ArchiveEntry::text(REPORT_PATH, artifacts.report().render()),
        ArchiveEntry::text(SUMMARY_PATH, to_json(&summary, "run summary")?),
    ];

    for (position, reference) in artifacts.references().iter().enumerate() {
        entries.push(ArchiveEntry::bytes(
            portrait_path(position, reference.name(), reference.mime_type()),
            reference.image().clone(),
        ));
    }
    for image in artifacts.scene_images() {
        entries.push(ArchiveEntry::bytes(
            scene_path(image.scene_index, &image.mime_type),
            image.image.clone(),
        ));
    }

    debug!(entries = entries.len(), "Packaged run");
    Ok(entries)
}

/// Writer for `output`: a zip file when it ends in `.zip`, a directory
/// otherwise.
pub fn writer_for(output: &Path) -> Box<dyn ArchiveWriter> {
    let is_zip = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        Box::new(ZipArchiveWriter::new(output))
    } else {
        Box::new(DirectoryWriter::new(output))
    }
}

/// Package a finished run and write it to `output`.
///
/// # Errors
///
/// Returns an error if packaging or writing fails.
pub async fn write_archive(
    artifacts: &GenerationArtifacts,
    output: &Path,
) -> TableauResult<WrittenArchive> {
    let entries = package(artifacts)?;
    let writer = writer_for(output);
    let written = writer.write(entries).await?;
    info!(
        backend = writer.backend_name(),
        location = %written.location.display(),
        files = written.manifest.entries.len(),
        "Storyboard archive written"
    );
    Ok(written)
}

/// Where the report of a failed run goes, next to the requested output.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tableau::package::failure_report_path;
///
/// assert_eq!(failure_report_path(Path::new("out/board.zip")), Path::new("out/board.report.txt"));
/// assert_eq!(failure_report_path(Path::new("board")), Path::new("board.report.txt"));
/// ```
pub fn failure_report_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("tableau");
    output.with_file_name(format!("{}.report.txt", stem))
}

/// Write the report of a failed run next to the requested output.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_failure_report(output: &Path, report: &GenerationReport) -> TableauResult<PathBuf> {
    let path = failure_report_path(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;
    }
    tokio::fs::write(&path, report.render()).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
    })?;
    Ok(path)
}

fn scene_index_of(path: &str) -> Option<(usize, &str)> {
    let file = path.strip_prefix("scenes/scene_")?;
    let (index, extension) = file.split_once('.')?;
    Some((index.parse().ok()?, extension))
}

/// Rebuild a slideshow from a directory archive written by [`package`].
///
/// Every file is verified against the archive manifest.
///
/// # Errors
///
/// Returns an error if the manifest, script or dialogue is missing or does
/// not verify.
#[instrument(skip(archive), fields(root = %archive.root().display()))]
pub async fn unpack_slideshow(
    archive: &DirectoryWriter,
    slide_duration: Duration,
) -> TableauResult<Slideshow> {
    let manifest = archive.read_manifest().await?;

    let script_json = archive.read_entry(&manifest, SCRIPT_JSON_PATH).await?;
    let script: Script = serde_json::from_slice(&script_json)
        .map_err(|e| JsonError::parse(SCRIPT_JSON_PATH, e))?;
    let dialogue_json = archive.read_entry(&manifest, DIALOGUE_PATH).await?;
    let dialogue: Vec<DialogueLine> = serde_json::from_slice(&dialogue_json)
        .map_err(|e| JsonError::parse(DIALOGUE_PATH, e))?;

    let mut scenes: Vec<(usize, &str, &str)> = manifest
        .entries
        .iter()
        .filter_map(|entry| {
            scene_index_of(&entry.path).map(|(index, ext)| (index, ext, entry.path.as_str()))
        })
        .collect();
    scenes.sort_by_key(|(index, _, _)| *index);

    let mut slides = Vec::with_capacity(scenes.len());
    for (scene_index, extension, path) in scenes {
        let image = archive.read_entry(&manifest, path).await?;
        slides.push(Slide {
            scene_index,
            image,
            mime_type: mime_for(extension).to_string(),
            caption: dialogue
                .iter()
                .find(|line| line.scene_index == scene_index)
                .cloned(),
        });
    }

    Ok(Slideshow::new(script.title().clone(), slides, slide_duration))
}
