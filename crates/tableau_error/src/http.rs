//! HTTP transport error types.

/// Transport failure talking to a generative service.
///
/// Covers failures before a status line arrives (connection refused, TLS,
/// timeouts). Non-success statuses are generation errors instead, since
/// they decide whether a run aborts.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// Error message
    pub message: String,
    /// Endpoint that was being called, if a request was sent
    pub endpoint: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            endpoint: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A request to `endpoint` that never produced a response.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_error::HttpError;
    ///
    /// let err = HttpError::request("models/gemini:generateContent", "operation timed out");
    /// assert_eq!(err.endpoint.as_deref(), Some("models/gemini:generateContent"));
    /// assert!(err.to_string().contains("operation timed out"));
    /// ```
    #[track_caller]
    pub fn request(endpoint: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let endpoint = endpoint.into();
        let mut err = Self::new(format!("Request to {} failed: {}", endpoint, cause));
        err.endpoint = Some(endpoint);
        err
    }
}
