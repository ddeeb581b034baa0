// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::rules::CodecSelector;

/// Input extensions offered to file pickers and directory scans
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v", "3gp", "mpg", "mpeg", "ts", "mts",
];

/// Output container selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Mp4,
    Avi,
    Mov,
    Mkv,
    Webm,
    Flv,
    Wmv,
    M4v,
}

impl TargetFormat {
    /// Every supported output format, in display order
    pub const ALL: [TargetFormat; 8] = [
        TargetFormat::Mp4,
        TargetFormat::Avi,
        TargetFormat::Mov,
        TargetFormat::Mkv,
        TargetFormat::Webm,
        TargetFormat::Flv,
        TargetFormat::Wmv,
        TargetFormat::M4v,
    ];

    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Mp4 => "mp4",
            TargetFormat::Avi => "avi",
            TargetFormat::Mov => "mov",
            TargetFormat::Mkv => "mkv",
            TargetFormat::Webm => "webm",
            TargetFormat::Flv => "flv",
            TargetFormat::Wmv => "wmv",
            TargetFormat::M4v => "m4v",
        }
    }

    /// Parse a format name, case-insensitive, tolerating a leading dot
    pub fn parse(format_str: &str) -> Result<Self, DomainError> {
        let normalized = format_str.trim().trim_start_matches('.').to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.extension() == normalized)
            .ok_or_else(|| {
                DomainError::BadArgs(format!(
                    "Invalid output format: {}. Valid formats: {}",
                    format_str,
                    Self::ALL.map(|f| f.extension()).join(", ")
                ))
            })
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Paired encoder selection and quality parameters for one target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodecProfile {
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub preset: &'static str,
    pub crf: u8,
}

/// Identifier of a job within its batch (1-based position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// One input-file-to-output-file conversion request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    id: JobId,
    input: PathBuf,
    output: PathBuf,
    format: TargetFormat,
    profile: CodecProfile,
}

impl ConversionJob {
    /// Create a job; the codec profile is derived from the target format
    pub fn new(id: JobId, input: PathBuf, output: PathBuf, format: TargetFormat) -> Self {
        Self {
            id,
            input,
            output,
            format,
            profile: CodecSelector::profile_for(format),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    pub fn profile(&self) -> &CodecProfile {
        &self.profile
    }

    /// File name of the input, for display
    pub fn display_name(&self) -> String {
        self.input
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Container label and duration reported by the probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub format: String,
    /// Seconds; absent when introspection failed
    pub duration: Option<f64>,
}

impl MediaInfo {
    /// Info for a file the probe could not read
    pub fn unknown(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            format: "unknown".to_string(),
            duration: None,
        }
    }

    /// Whether progress can be expressed as a percentage
    pub fn has_duration(&self) -> bool {
        matches!(self.duration, Some(d) if d > 0.0)
    }
}

/// Transient completion estimate for a running job
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub job: JobId,
    /// 0.0 - 100.0, non-decreasing per job
    pub percent: f64,
}

/// Terminal status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// Outcome of exactly one submitted job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub job: JobId,
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl JobResult {
    /// Successful result for a job
    pub fn succeeded(job: &ConversionJob, elapsed_ms: u64) -> Self {
        Self {
            job: job.id(),
            input: job.input().to_path_buf(),
            output: job.output().to_path_buf(),
            status: JobStatus::Succeeded,
            message: None,
            elapsed_ms,
        }
    }

    /// Failed result carrying the reason as its diagnostic
    pub fn failed(job: &ConversionJob, error: &DomainError, elapsed_ms: u64) -> Self {
        Self {
            job: job.id(),
            input: job.input().to_path_buf(),
            output: job.output().to_path_buf(),
            status: JobStatus::Failed,
            message: Some(error.to_string()),
            elapsed_ms,
        }
    }

    /// Failed result for a job that never started
    pub fn cancelled(job: &ConversionJob) -> Self {
        Self::failed(job, &DomainError::Cancelled, 0)
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

/// Ordered results, one per submitted job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub results: Vec<JobResult>,
}

impl BatchResult {
    pub fn new(results: Vec<JobResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter()
    }

    /// Number of succeeded jobs
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed jobs (cancelled ones included)
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn is_all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}
