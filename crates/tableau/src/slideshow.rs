//! Timed slideshow over a finished storyboard.
//!
//! A pure state machine: the caller drives time through [`Slideshow::tick`]
//! and renders whatever [`Slideshow::state`] says. Nothing here touches the
//! pipeline's artifacts; slides are copies.

use derive_getters::Getters;
use std::time::Duration;
use tableau_core::DialogueLine;
use tableau_pipeline::GenerationArtifacts;

/// One scene image with its caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// Scene index in the script
    pub scene_index: usize,
    /// Encoded image
    pub image: Vec<u8>,
    /// MIME type of `image`
    pub mime_type: String,
    /// Dialogue shown under the image
    pub caption: Option<DialogueLine>,
}

impl Slide {
    /// Caption text as `CHARACTER: line`, if the slide has dialogue.
    pub fn caption_text(&self) -> Option<String> {
        self.caption
            .as_ref()
            .map(|line| format!("{}: {}", line.character, line.text))
    }
}

/// Where the slideshow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideshowState {
    /// Not started
    Idle,
    /// Showing the title card
    Title,
    /// Showing the slide at this position
    Slide(usize),
    /// Past the last slide
    Finished,
}

/// Title card followed by one slide per generated scene.
#[derive(Debug, Clone, Getters)]
pub struct Slideshow {
    /// Storyboard title
    title: String,
    /// Slides in scene order
    slides: Vec<Slide>,
    /// Time each card stays on screen
    slide_duration: Duration,
    /// Current position
    state: SlideshowState,
    /// Whether time advances the slideshow
    playing: bool,
    /// Time spent on the current card
    elapsed: Duration,
}

impl Slideshow {
    /// Create a slideshow. Slides are shown in ascending scene order.
    pub fn new(title: impl Into<String>, mut slides: Vec<Slide>, slide_duration: Duration) -> Self {
        slides.sort_by_key(|slide| slide.scene_index);
        Self {
            title: title.into(),
            slides,
            slide_duration,
            state: SlideshowState::Idle,
            playing: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Build a slideshow from a finished run.
    pub fn from_artifacts(artifacts: &GenerationArtifacts, slide_duration: Duration) -> Self {
        let slides = artifacts
            .scene_images()
            .iter()
            .map(|image| Slide {
                scene_index: image.scene_index,
                image: image.image.clone(),
                mime_type: image.mime_type.clone(),
                caption: artifacts
                    .dialogue()
                    .iter()
                    .find(|line| line.scene_index == image.scene_index)
                    .cloned(),
            })
            .collect();
        Self::new(artifacts.script().title().clone(), slides, slide_duration)
    }

    /// Start or resume. Starting from idle shows the title card.
    pub fn play(&mut self) {
        match self.state {
            SlideshowState::Finished => {}
            SlideshowState::Idle => {
                self.state = SlideshowState::Title;
                self.elapsed = Duration::ZERO;
                self.playing = true;
            }
            _ => self.playing = true,
        }
    }

    /// Stop advancing; the current card stays.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Back to idle.
    pub fn reset(&mut self) {
        self.state = SlideshowState::Idle;
        self.playing = false;
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `delta` and return the new state.
    ///
    /// A large `delta` may skip several cards. Paused, idle and finished
    /// slideshows do not move.
    pub fn tick(&mut self, delta: Duration) -> SlideshowState {
        if !self.playing {
            return self.state;
        }
        self.elapsed += delta;
        while self.playing && self.elapsed >= self.slide_duration {
            self.elapsed -= self.slide_duration;
            self.advance();
        }
        self.state
    }

    fn advance(&mut self) {
        self.state = match self.state {
            SlideshowState::Title if !self.slides.is_empty() => SlideshowState::Slide(0),
            SlideshowState::Slide(i) if i + 1 < self.slides.len() => SlideshowState::Slide(i + 1),
            _ => SlideshowState::Finished,
        };
        if self.state == SlideshowState::Finished {
            self.playing = false;
            self.elapsed = Duration::ZERO;
        }
    }

    /// The slide on screen, if any.
    pub fn current_slide(&self) -> Option<&Slide> {
        match self.state {
            SlideshowState::Slide(i) => self.slides.get(i),
            _ => None,
        }
    }

    /// Whether the last slide has been passed.
    pub fn is_finished(&self) -> bool {
        self.state == SlideshowState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(scene_index: usize, caption: Option<&str>) -> Slide {
        Slide {
            scene_index,
            image: vec![scene_index as u8],
            mime_type: "image/png".to_string(),
            caption: caption.map(|text| DialogueLine {
                scene_index,
                character: "ADA".to_string(),
                text: text.to_string(),
                source_element_index: scene_index + 1,
                is_duplicate: false,
                occurrence: 0,
            }),
        }
    }

    fn show() -> Slideshow {
        Slideshow::new(
            "Harbor",
            vec![slide(5, None), slide(1, Some("Almost there."))],
            Duration::from_secs(3),
        )
    }

    #[test]
    fn plays_title_then_slides_in_scene_order() {
        let mut show = show();
        assert_eq!(show.tick(Duration::from_secs(10)), SlideshowState::Idle);

        show.play();
        assert_eq!(*show.state(), SlideshowState::Title);
        assert_eq!(show.tick(Duration::from_secs(2)), SlideshowState::Title);
        assert_eq!(show.tick(Duration::from_secs(1)), SlideshowState::Slide(0));
        assert_eq!(show.current_slide().map(|s| s.scene_index), Some(1));
        assert_eq!(
            show.current_slide().and_then(Slide::caption_text).as_deref(),
            Some("ADA: Almost there.")
        );
        assert_eq!(show.tick(Duration::from_secs(3)), SlideshowState::Slide(1));
        assert_eq!(show.tick(Duration::from_secs(3)), SlideshowState::Finished);
        assert!(!show.playing());
    }

    #[test]
    fn large_ticks_skip_cards() {
        let mut show = show();
        show.play();
        assert_eq!(show.tick(Duration::from_secs(7)), SlideshowState::Slide(1));
        assert_eq!(*show.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn pause_holds_and_reset_returns_to_idle() {
        let mut show = show();
        show.play();
        show.tick(Duration::from_secs(3));
        show.pause();
        assert_eq!(show.tick(Duration::from_secs(30)), SlideshowState::Slide(0));

        show.play();
        assert_eq!(show.tick(Duration::from_secs(3)), SlideshowState::Slide(1));

        show.reset();
        assert_eq!(*show.state(), SlideshowState::Idle);
        assert!(show.current_slide().is_none());
    }

    #[test]
    fn empty_slideshow_finishes_after_title() {
        let mut show = Slideshow::new("Empty", Vec::new(), Duration::from_secs(1));
        show.play();
        assert_eq!(show.tick(Duration::from_secs(1)), SlideshowState::Finished);
        assert!(show.is_finished());
    }
}
