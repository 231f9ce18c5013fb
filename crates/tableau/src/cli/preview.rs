//! Slideshow preview command handler.

use std::path::Path;
use std::time::Duration;
use tableau::package::unpack_slideshow;
use tableau::slideshow::{Slideshow, SlideshowState};
use tableau::DirectoryWriter;

fn render(show: &Slideshow) {
    match show.state() {
        SlideshowState::Title => println!("\n== {} ==\n", show.title()),
        SlideshowState::Slide(position) => {
            if let Some(slide) = show.current_slide() {
                println!(
                    "[{}/{}] scene {} ({}, {} bytes)",
                    position + 1,
                    show.slides().len(),
                    slide.scene_index,
                    slide.mime_type,
                    slide.image.len()
                );
                if let Some(caption) = slide.caption_text() {
                    println!("    {}", caption);
                }
            }
        }
        SlideshowState::Finished => println!("\n(end)"),
        SlideshowState::Idle => {}
    }
}

/// Play a directory archive in the terminal.
pub async fn preview_archive(archive: &Path, seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    let slide_duration = Duration::from_secs(seconds.max(1));
    let mut show = unpack_slideshow(&DirectoryWriter::new(archive), slide_duration).await?;
    tracing::info!(slides = show.slides().len(), "Starting preview");

    show.play();
    render(&show);
    while !show.is_finished() {
        tokio::time::sleep(slide_duration).await;
        show.tick(slide_duration);
        render(&show);
    }
    Ok(())
}
