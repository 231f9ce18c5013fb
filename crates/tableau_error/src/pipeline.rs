//! Pipeline orchestration error types.

/// Fatal conditions that abort a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A structurally required stage failed
    #[display("Stage '{}' failed: {}", stage, message)]
    StageFailed {
        /// Stage name
        stage: String,
        /// Failure description
        message: String,
    },
    /// Ingestion produced no text to analyse
    #[display("No reference text was found in the uploaded material")]
    NoSourceText,
    /// The script stage returned no usable scene elements
    #[display("Generated script contains no usable scene elements")]
    EmptyScript,
}

/// Error type for pipeline orchestration.
///
/// # Examples
///
/// ```
/// use tableau_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyScript);
/// assert!(format!("{}", err).contains("no usable scene"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
