//! Test utilities for pipeline tests.
//!
//! Mock text and image services plus a small storyboard fixture.

pub mod fixtures;
pub mod mock_services;

#[allow(unused_imports)]
pub use fixtures::{action_only_story, ada_portrait, harbor_run, harbor_script, story_upload};
#[allow(unused_imports)]
pub use mock_services::{MockImage, MockImageService, MockTextService, RecordedImageRequest};
