//! Errors reading or writing the JSON artifacts of a storyboard.

/// JSON error with the artifact it concerns.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// Error message
    pub message: String,
    /// Artifact being encoded or decoded, e.g. `script.json`
    pub artifact: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            artifact: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Encoding `artifact` failed.
    #[track_caller]
    pub fn serialize(artifact: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::for_artifact("serialize", artifact.into(), cause)
    }

    /// Decoding `artifact` failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_error::JsonError;
    ///
    /// let err = JsonError::parse("dialogue.json", "expected `[`");
    /// assert_eq!(err.artifact.as_deref(), Some("dialogue.json"));
    /// assert!(err.message.starts_with("Failed to parse dialogue.json"));
    /// ```
    #[track_caller]
    pub fn parse(artifact: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::for_artifact("parse", artifact.into(), cause)
    }

    #[track_caller]
    fn for_artifact(action: &str, artifact: String, cause: impl std::fmt::Display) -> Self {
        let mut err = Self::new(format!("Failed to {} {}: {}", action, artifact, cause));
        err.artifact = Some(artifact);
        err
    }
}
