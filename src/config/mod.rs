//! Configuration management for ImageResizer

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{Result, ResizerError};
use crate::processing::{DimensionLimits, FilterType};

pub mod request;
pub use request::*;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Codec settings
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Codec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Resampling filter used for every frame
    pub filter: FilterType,

    /// Quality for JPEG output (1-100)
    pub jpeg_quality: u8,

    /// Largest allowed target width or height
    pub max_dimension: u32,

    /// Largest allowed target area, in megapixels
    pub max_megapixels: u64,
}

impl ProcessingConfig {
    pub fn limits(&self) -> DimensionLimits {
        DimensionLimits::new(self.max_dimension, self.max_megapixels)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            jpeg_quality: 90,
            max_dimension: 32768,
            max_megapixels: 500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level directive (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ResizerError::config(
                format!("Failed to read config file {:?}: {}", path.as_ref(), e)
            ))?;

        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let config: Config = match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => return Err(ResizerError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.processing.jpeg_quality) {
            return Err(ResizerError::config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.processing.jpeg_quality
            )));
        }

        if self.processing.max_dimension == 0 || self.processing.max_megapixels == 0 {
            return Err(ResizerError::config("Size limits must be greater than 0"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ResizerError::config("Log level must not be empty"));
        }

        Ok(())
    }
}
