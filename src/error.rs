//! Error types and handling for ImageResizer

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for ImageResizer operations
pub type Result<T> = std::result::Result<T, ResizerError>;

/// Main error type for ImageResizer operations
#[derive(Debug, Error)]
pub enum ResizerError {
    /// Bad or missing command-line arguments
    #[error("{message}")]
    Usage { message: String },

    /// Single input file does not exist
    #[error("File: '{}' does not exist.", path.display())]
    NotFound { path: PathBuf },

    /// File could not be read or decoded as an image
    #[error("Cannot read image {}: {message}", file.display())]
    Decode { file: PathBuf, message: String },

    /// Result could not be encoded or written
    #[error("Cannot write image {}: {message}", file.display())]
    Encode { file: PathBuf, message: String },

    /// Destination is not writable
    #[error("Cannot write to {}: {message}", file.display())]
    Permission { file: PathBuf, message: String },

    /// I/O errors without file context
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ResizerError {
    /// Create a new usage error
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(file: &Path, message: S) -> Self {
        Self::Decode {
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(file: &Path, message: S) -> Self {
        Self::Encode {
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a new permission error
    pub fn permission<S: Into<String>>(file: &Path, message: S) -> Self {
        Self::Permission {
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (the batch can continue)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Decode { .. }
            | Self::Encode { .. }
            | Self::Permission { .. }
            | Self::IoError(_) => true,

            Self::Usage { .. }
            | Self::NotFound { .. }
            | Self::ConfigError { .. }
            | Self::SerdeError(_) => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path } => Some(path),
            Self::Decode { file, .. }
            | Self::Encode { file, .. }
            | Self::Permission { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Message without the file name, for output that already names the file
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode { message, .. } => format!("cannot read image: {}", message),
            Self::Encode { message, .. } => format!("cannot write image: {}", message),
            Self::Permission { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for ResizerError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ResizerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}

/// Error context extension for attaching the offending file to codec and I/O errors
pub trait ErrorContext<T> {
    /// Treat the error as a failure to read `file`
    fn decode_context(self, file: &Path) -> Result<T>;

    /// Treat the error as a failure to write `file`
    fn encode_context(self, file: &Path) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn decode_context(self, file: &Path) -> Result<T> {
        self.map_err(|e| ResizerError::decode(file, e.to_string()))
    }

    fn encode_context(self, file: &Path) -> Result<T> {
        self.map_err(|e| ResizerError::encode(file, e.to_string()))
    }
}
