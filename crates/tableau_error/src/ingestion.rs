//! Ingestion error types.

/// Specific error conditions while reading uploaded material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IngestionErrorKind {
    /// A file or archive entry could not be read
    #[display("Failed to read '{}': {}", name, message)]
    UnreadableEntry {
        /// Upload or archive entry name
        name: String,
        /// Underlying failure
        message: String,
    },
    /// An archive could not be opened or walked
    #[display("Failed to open archive '{}': {}", name, message)]
    Archive {
        /// Archive name
        name: String,
        /// Underlying failure
        message: String,
    },
    /// The file type is not recognised
    #[display("Unsupported file type: {}", _0)]
    UnsupportedType(String),
}

/// Error type for ingestion.
///
/// Ingestion errors are always recoverable: the offending item lands in the
/// ignored list and the run proceeds.
///
/// # Examples
///
/// ```
/// use tableau_error::{IngestionError, IngestionErrorKind};
///
/// let err = IngestionError::new(IngestionErrorKind::UnsupportedType("notes.pdf".to_string()));
/// assert!(format!("{}", err).contains("notes.pdf"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ingestion Error: {} at line {} in {}", kind, line, file)]
pub struct IngestionError {
    /// The specific error condition
    pub kind: IngestionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl IngestionError {
    /// Create a new IngestionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IngestionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
