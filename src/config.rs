//! Configuration file support.
//!
//! Settings are plain JSON read from and written to an explicit path. Nothing
//! is loaded implicitly and nothing from a session is written back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Palette;
use crate::constants;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Annotator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Colors offered in the picker and the initial selection
    #[serde(default)]
    pub palette: Palette,

    /// Geometry of the annotation tools
    #[serde(default)]
    pub tools: ToolSettings,

    /// Export output settings
    #[serde(default)]
    pub export: ExportSettings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Sizes used when the pointer interpreter creates annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub highlight_height: f32,
    pub underline_width: f32,
    pub underline_height: f32,
    pub comment_width: f32,
    pub comment_height: f32,
    /// Erase hit distance for strokes, in viewport pixels
    pub erase_tolerance: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            highlight_height: constants::HIGHLIGHT_HEIGHT,
            underline_width: constants::UNDERLINE_WIDTH,
            underline_height: constants::UNDERLINE_HEIGHT,
            comment_width: constants::COMMENT_WIDTH,
            comment_height: constants::COMMENT_HEIGHT,
            erase_tolerance: constants::ERASE_TOLERANCE,
        }
    }
}

/// How exported artifacts are drawn and named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub stroke_width: f32,
    pub caption_size: f32,
    pub highlight_opacity: f32,
    pub png_file_name: String,
    pub pdf_file_name: String,
    /// Page size in points for PDFs built from images
    pub pdf_page_width: f32,
    pub pdf_page_height: f32,
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            stroke_width: constants::EXPORT_STROKE_WIDTH,
            caption_size: constants::CAPTION_SIZE,
            highlight_opacity: constants::HIGHLIGHT_OPACITY,
            png_file_name: constants::PNG_FILE_NAME.to_string(),
            pdf_file_name: constants::PDF_FILE_NAME.to_string(),
            pdf_page_width: ritease_render::A4_WIDTH_PT,
            pdf_page_height: ritease_render::A4_HEIGHT_PT,
            jpeg_quality: constants::JPEG_QUALITY,
        }
    }
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            palette: Palette::default(),
            tools: ToolSettings::default(),
            export: ExportSettings::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tools.highlight_height", self.tools.highlight_height),
            ("tools.underline_width", self.tools.underline_width),
            ("tools.underline_height", self.tools.underline_height),
            ("tools.comment_width", self.tools.comment_width),
            ("tools.comment_height", self.tools.comment_height),
            ("export.stroke_width", self.export.stroke_width),
            ("export.caption_size", self.export.caption_size),
            ("export.pdf_page_width", self.export.pdf_page_width),
            ("export.pdf_page_height", self.export.pdf_page_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(format!("{field} must be positive")));
            }
        }
        if !(self.tools.erase_tolerance.is_finite() && self.tools.erase_tolerance >= 0.0) {
            return Err(ConfigError::invalid("tools.erase_tolerance must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.export.highlight_opacity) {
            return Err(ConfigError::invalid(
                "export.highlight_opacity must be between 0 and 1",
            ));
        }
        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(ConfigError::invalid(
                "export.jpeg_quality must be between 1 and 100",
            ));
        }
        if self.palette.colors.is_empty() {
            return Err(ConfigError::invalid("palette.colors must not be empty"));
        }
        Ok(())
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_roundtrip() {
        let mut config = AnnotatorConfig::new();
        config.palette.default = Color::new(0x4E, 0xCD, 0xC4);
        config.export.jpeg_quality = 70;
        config.log_level = LogLevel::Debug;

        let json = config.to_json().unwrap();
        assert_eq!(AnnotatorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_newer_version() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            AnnotatorConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { file_version, .. }) if file_version == CONFIG_VERSION + 1
        ));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AnnotatorConfig::from_json(r#"{"version": 1, "log_level": "warn"}"#).unwrap();
        assert_eq!(config.tools, ToolSettings::default());
        assert_eq!(config.export.png_file_name, "annotated-image.png");
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let json = r#"{"version": 1, "export": {"highlight_opacity": 1.5}}"#;
        assert!(matches!(
            AnnotatorConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
        let json = r#"{"version": 1, "tools": {"underline_width": 0}}"#;
        assert!(matches!(
            AnnotatorConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ritease.json");

        let config = AnnotatorConfig::new();
        config.save(&path).unwrap();
        assert_eq!(AnnotatorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AnnotatorConfig::load(&dir.path().join("absent.json")),
            Err(ConfigError::IoError(_))
        ));
    }
}
