//! Top-level error wrapper types.

use crate::{
    ConfigError, GenerationError, HttpError, IngestionError, JsonError, PipelineError,
    StorageError,
};

/// Union of every domain error in the workspace.
///
/// # Examples
///
/// ```
/// use tableau_error::{TableauError, HttpError};
///
/// let http_err = HttpError::new("Connection refused");
/// let err: TableauError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TableauErrorKind {
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Generative service error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Ingestion error
    #[from(IngestionError)]
    Ingestion(IngestionError),
    /// Pipeline orchestration error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Storage or archive error
    #[from(StorageError)]
    Storage(StorageError),
}

/// Tableau error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tableau_error::{TableauResult, ConfigError};
///
/// fn might_fail() -> TableauResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tableau Error: {}", _0)]
pub struct TableauError(Box<TableauErrorKind>);

impl TableauError {
    /// Create a new error from a kind.
    pub fn new(kind: TableauErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TableauErrorKind {
        &self.0
    }

    /// Whether this error is a credential failure that must abort the run.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_error::{GenerationError, GenerationErrorKind, TableauError};
    ///
    /// let err: TableauError = GenerationError::new(GenerationErrorKind::Http {
    ///     status_code: 401,
    ///     message: "API key not valid".to_string(),
    /// })
    /// .into();
    /// assert!(err.is_authentication());
    /// ```
    pub fn is_authentication(&self) -> bool {
        matches!(self.kind(), TableauErrorKind::Generation(e) if e.kind.is_authentication())
    }

    /// Whether this error is a content-safety rejection.
    pub fn is_safety_rejection(&self) -> bool {
        matches!(self.kind(), TableauErrorKind::Generation(e) if e.kind.is_safety_rejection())
    }
}

// Generic From implementation for any type that converts to TableauErrorKind
impl<T> From<T> for TableauError
where
    T: Into<TableauErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for tableau operations.
pub type TableauResult<T> = std::result::Result<T, TableauError>;
