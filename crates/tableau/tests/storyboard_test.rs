//! Packaging, archive writing and slideshow round trip over a mock run.

mod test_utils;

use std::time::Duration;
use tableau::package::{
    DIALOGUE_PATH, REPORT_PATH, SCRIPT_TEXT_PATH, SUMMARY_PATH, RunSummary, failure_report_path,
    package, unpack_slideshow, write_archive, write_failure_report,
};
use tableau::slideshow::{Slideshow, SlideshowState};
use tableau::{
    DirectoryWriter, GenerationErrorKind, MANIFEST_PATH, Pipeline, PipelineConfig, Stage,
};
use test_utils::{EchoImages, ScriptedText, ferry_run, uploads};

fn pipeline(responses: Vec<Result<serde_json::Value, GenerationErrorKind>>) -> Pipeline<ScriptedText, EchoImages> {
    Pipeline::new(ScriptedText::new(responses), EchoImages, PipelineConfig::default())
}

#[tokio::test]
async fn package_uses_deterministic_paths() -> anyhow::Result<()> {
    let artifacts = pipeline(ferry_run()).run(uploads()).await?;

    let entries = package(&artifacts)?;
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();

    assert!(paths.contains(&"story.json"));
    assert!(paths.contains(&SCRIPT_TEXT_PATH));
    assert!(paths.contains(&DIALOGUE_PATH));
    assert!(paths.contains(&REPORT_PATH));
    assert!(paths.contains(&"portraits/01_mara.jpg"));
    assert!(paths.contains(&"portraits/02_otto.png"));
    assert!(paths.contains(&"scenes/scene_0001.png"));
    assert!(paths.contains(&"scenes/scene_0005.png"));

    let again = package(&artifacts)?;
    let again_paths: Vec<&str> = again.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, again_paths);
    Ok(())
}

#[tokio::test]
async fn directory_archive_round_trips_into_slideshow() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("board");
    let artifacts = pipeline(ferry_run()).run(uploads()).await?;

    let written = write_archive(&artifacts, &output).await?;
    assert_eq!(written.location, output);
    assert!(output.join(MANIFEST_PATH).exists());

    let summary: RunSummary =
        serde_json::from_str(&std::fs::read_to_string(output.join(SUMMARY_PATH))?)?;
    assert_eq!(summary.title, "Night Ferry");
    assert_eq!(summary.scenes, vec![1, 5]);

    let screenplay = std::fs::read_to_string(output.join(SCRIPT_TEXT_PATH))?;
    assert!(screenplay.contains("EXT. BAY - NIGHT"));

    let mut show = unpack_slideshow(&DirectoryWriter::new(&output), Duration::from_secs(2)).await?;
    assert_eq!(show.title(), "Night Ferry");
    assert_eq!(show.slides().len(), 2);

    show.play();
    show.tick(Duration::from_secs(2));
    let first = show.current_slide().expect("first slide");
    assert_eq!(first.scene_index, 1);
    assert_eq!(first.caption_text().as_deref(), Some("OTTO: Lights!"));
    assert_eq!(first.image, b"Fog and a steering wheel".to_vec());

    // The pier heading separates scene 5 from Otto's line
    show.tick(Duration::from_secs(2));
    let second = show.current_slide().expect("second slide");
    assert_eq!(second.scene_index, 5);
    assert_eq!(second.caption_text(), None);

    assert_eq!(show.tick(Duration::from_secs(2)), SlideshowState::Finished);
    Ok(())
}

#[tokio::test]
async fn zip_output_is_a_single_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("board.zip");
    let artifacts = pipeline(ferry_run()).run(uploads()).await?;

    let written = write_archive(&artifacts, &output).await?;

    assert!(output.is_file());
    assert!(written.manifest.get("scenes/scene_0005.png").is_some());
    Ok(())
}

#[tokio::test]
async fn failed_run_report_lands_next_to_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("board.zip");
    let mut responses = ferry_run();
    responses.truncate(1);
    responses.push(Err(GenerationErrorKind::Service("timeout".to_string())));

    let failure = pipeline(responses)
        .run(uploads())
        .await
        .expect_err("script stage fails");
    assert_eq!(failure.stage, Stage::GenerateScript);

    let path = write_failure_report(&output, &failure.report).await?;
    assert_eq!(path, failure_report_path(&output));
    assert!(!output.exists());
    let text = std::fs::read_to_string(path)?;
    assert!(text.contains("ABORTED"));
    Ok(())
}

#[tokio::test]
async fn slideshow_from_artifacts_matches_scene_images() -> anyhow::Result<()> {
    let artifacts = pipeline(ferry_run()).run(uploads()).await?;

    let show = Slideshow::from_artifacts(&artifacts, Duration::from_secs(1));

    let scenes: Vec<usize> = show.slides().iter().map(|s| s.scene_index).collect();
    assert_eq!(scenes, vec![1, 5]);
    assert_eq!(*show.state(), SlideshowState::Idle);
    assert_eq!(artifacts.scene_images().len(), 2);
    Ok(())
}
