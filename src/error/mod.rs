//! Error handling module for VidConv

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for VidConv operations
///
/// These surface at the application boundary. Faults of a single conversion
/// job never take this shape; they are folded into a `JobResult` instead.
#[derive(Error, Debug)]
pub enum VidConvError {
    /// External media tool is not invocable
    #[error("ffmpeg is not available at '{path}'. Install it or run `vidconv tool install`")]
    ToolUnavailable { path: PathBuf },

    /// Tool installation attempt failed
    #[error("Failed to install ffmpeg: {message}")]
    AcquisitionFailed { message: String },

    /// A job could not be planned from the given inputs
    #[error("Invalid job: {message}")]
    InvalidJob { message: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Batch aborted by the user
    #[error("Batch cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl VidConvError {
    /// Create an invalid job error
    pub fn invalid_job(message: impl Into<String>) -> Self {
        Self::InvalidJob {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for VidConv operations
pub type VidConvResult<T> = std::result::Result<T, VidConvError>;
