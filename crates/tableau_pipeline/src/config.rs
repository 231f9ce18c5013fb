//! Pipeline configuration.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. An explicit file passed by the caller
//! 2. `./tableau.toml` (current directory)
//! 3. `~/.config/tableau/tableau.toml` (user config)
//! 4. Bundled defaults (`include_str!` of the workspace `tableau.toml`)

use config::{Config, File, FileFormat};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tableau_error::{ConfigError, TableauResult};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../tableau.toml");

/// Settings for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), default)]
pub struct PipelineConfig {
    /// Model for structured text calls
    text_model: String,
    /// Model for image calls
    image_model: String,
    /// Visual style passed with every image request
    style: String,
    /// Scene image aspect ratio
    aspect_ratio: String,
    /// Portrait aspect ratio
    portrait_aspect_ratio: String,
    /// Maximum number of scene images per run
    max_scene_images: usize,
    /// Fuzzy match acceptance threshold
    match_threshold: f64,
    /// Generative API root
    api_base_url: String,
    /// Per-request timeout
    request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            style: "cinematic storyboard illustration".to_string(),
            aspect_ratio: "16:9".to_string(),
            portrait_aspect_ratio: "3:4".to_string(),
            max_scene_images: 20,
            match_threshold: crate::resolver::DEFAULT_MATCH_THRESHOLD,
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder seeded with defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load configuration with the standard precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the result
    /// fails validation.
    pub fn load() -> TableauResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration, layering `explicit` on top when given.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing, a file cannot be parsed,
    /// or the result fails validation.
    #[instrument]
    pub fn load_with(explicit: Option<&Path>) -> TableauResult<Self> {
        debug!("Loading configuration with precedence: explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tableau/tableau.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("tableau").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load only the bundled defaults and one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn from_file(path: impl AsRef<Path>) -> TableauResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero scene cap, a threshold outside `(0, 1]`,
    /// a zero timeout, or blank model names.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_pipeline::PipelineConfig;
    ///
    /// let config = PipelineConfig::builder().max_scene_images(0usize).build().unwrap();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> TableauResult<()> {
        if self.max_scene_images == 0 {
            return Err(ConfigError::invalid("max_scene_images", "must be at least 1").into());
        }
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(ConfigError::invalid(
                "match_threshold",
                format!("must be in (0, 1], got {}", self.match_threshold),
            )
            .into());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be at least 1").into());
        }
        if self.text_model.trim().is_empty() || self.image_model.trim().is_empty() {
            return Err(ConfigError::new("text_model and image_model must not be empty").into());
        }
        Ok(())
    }

    /// Copy with a different style.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Copy with a different scene aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    /// Copy with a different scene cap.
    pub fn with_max_scene_images(mut self, max_scene_images: usize) -> Self {
        self.max_scene_images = max_scene_images;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_parse_and_validate() {
        let config: PipelineConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        config.validate().unwrap();
        assert_eq!(*config.max_scene_images(), 20);
        assert_eq!(*config.match_threshold(), 0.5);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "max_scene_images = 3\nstyle = \"charcoal\"\n").unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(*config.max_scene_images(), 3);
        assert_eq!(config.style(), "charcoal");
        assert_eq!(config.aspect_ratio(), "16:9");
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = PipelineConfig::builder().match_threshold(1.5).build().unwrap();
        let err = config.validate().unwrap_err();
        match err.kind() {
            tableau_error::TableauErrorKind::Config(e) => {
                assert_eq!(e.setting.as_deref(), Some("match_threshold"))
            }
            other => panic!("expected config error, got {}", other),
        }
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
