//! Trait definitions for the tableau generative collaborators.
//!
//! The pipeline only talks to generative services through these traits, so
//! a run can be driven by a live backend or by a scripted test double.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageGeneration, StructuredGeneration};
