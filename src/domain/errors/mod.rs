// Domain errors - Why a single conversion job failed

use std::fmt;

/// Job-level failure reasons
///
/// Rendered into `JobResult::message`; never propagated past the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The tool could not be launched (missing binary, permission denied)
    SpawnFailed(String),
    /// The tool exited unsuccessfully
    ToolFailed {
        code: Option<i32>,
        tail: Vec<String>,
    },
    /// The tool reported success but left no output file behind
    MissingOutput(String),
    /// The output file exists but is empty
    EmptyOutput(String),
    /// Reading the tool's diagnostic stream or waiting on it failed
    StreamFailed(String),
    /// The output folder could not be prepared
    OutputDir(String),
    /// The job was cancelled before or while running
    Cancelled,
    /// Invalid arguments provided
    BadArgs(String),
}

impl DomainError {
    /// Whether this failure came from a cancellation request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::SpawnFailed(msg) => write!(f, "Failed to start ffmpeg: {}", msg),
            DomainError::ToolFailed { code, tail } => {
                match code {
                    Some(code) => write!(f, "ffmpeg exited with status {}", code)?,
                    None => write!(f, "ffmpeg was terminated by a signal")?,
                }
                if !tail.is_empty() {
                    write!(f, ":\n{}", tail.join("\n"))?;
                }
                Ok(())
            }
            DomainError::MissingOutput(path) => write!(f, "Output file was not created: {}", path),
            DomainError::EmptyOutput(path) => write!(f, "Output file is empty: {}", path),
            DomainError::StreamFailed(msg) => write!(f, "Lost contact with ffmpeg: {}", msg),
            DomainError::OutputDir(msg) => write!(f, "Cannot prepare output folder: {}", msg),
            DomainError::Cancelled => write!(f, "cancelled"),
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
