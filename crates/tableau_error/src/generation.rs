//! Generative-service error types.

/// Failure conditions reported by the text and image generation services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Credentials were rejected by the service
    #[display("Authentication failed: {}", _0)]
    Authentication(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// The service call failed for a non-HTTP reason
    #[display("Generation service failed: {}", _0)]
    Service(String),
    /// The service answered but the payload was empty or absent
    #[display("Empty payload returned for {}", _0)]
    EmptyPayload(String),
    /// The payload did not match the requested schema
    #[display("Malformed payload: {}", _0)]
    MalformedPayload(String),
    /// The request was blocked by content-safety filtering
    #[display("Request blocked by safety filter: {}", _0)]
    SafetyRejection(String),
}

impl GenerationErrorKind {
    /// Whether this failure means the credentials are unusable.
    ///
    /// Authentication failures are never worth repeating inside a run,
    /// so per-item stages propagate them instead of skipping the item.
    pub fn is_authentication(&self) -> bool {
        match self {
            GenerationErrorKind::MissingApiKey | GenerationErrorKind::Authentication(_) => true,
            GenerationErrorKind::Http { status_code, .. } => matches!(*status_code, 401 | 403),
            _ => false,
        }
    }

    /// Whether this failure came from content-safety filtering.
    pub fn is_safety_rejection(&self) -> bool {
        matches!(self, GenerationErrorKind::SafetyRejection(_))
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use tableau_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// assert!(err.kind.is_authentication());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
