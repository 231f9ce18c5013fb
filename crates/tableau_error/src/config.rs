//! Configuration error types.

/// A `tableau.toml` layer that failed to load, or a setting that failed validation.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Offending setting, when a single one is to blame
    pub setting: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Error not tied to one setting, such as an unreadable layer.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            setting: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A setting whose value the pipeline cannot run with.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_error::ConfigError;
    ///
    /// let err = ConfigError::invalid("max_scene_images", "must be at least 1");
    /// assert_eq!(err.setting.as_deref(), Some("max_scene_images"));
    /// assert!(err.to_string().contains("max_scene_images must be at least 1"));
    /// ```
    #[track_caller]
    pub fn invalid(setting: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let setting = setting.into();
        let mut err = Self::new(format!("{} {}", setting, reason));
        err.setting = Some(setting);
        err
    }
}
