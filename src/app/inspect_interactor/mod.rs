// Inspect interactor - Reports detected format and duration of media files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::{VidConvError, VidConvResult};
use crate::ports::*;
use crate::utils::time::format_seconds;
use crate::utils::{format_file_size, PathUtils};

/// What `inspect` reports for one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    /// Extension when it is a known video extension, else the probed container
    pub format: String,
    /// Container name reported by the probe
    pub container: String,
    pub duration: Option<f64>,
    pub size_bytes: u64,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Format label for a file: its extension when that is a known video
    /// extension, otherwise what the probe reports, otherwise "unknown".
    pub async fn detect_format(&self, path: &Path) -> String {
        match Self::video_extension(path) {
            Some(ext) => ext,
            None => self.probe_port.probe(path).await.format,
        }
    }

    /// Lowercased extension, only when it names a supported video type
    fn video_extension(path: &Path) -> Option<String> {
        PathUtils::get_extension(path).filter(|_| PathUtils::has_supported_extension(path))
    }

    /// Inspect one existing file
    pub async fn inspect_file(&self, path: &Path) -> VidConvResult<InspectReport> {
        info!("Inspecting {}", path.display());

        let metadata = std::fs::metadata(path).map_err(|e| {
            VidConvError::invalid_job(format!("Cannot inspect {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(VidConvError::invalid_job(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let media = self.probe_port.probe(path).await;
        let format = Self::video_extension(path).unwrap_or_else(|| media.format.clone());

        Ok(InspectReport {
            path: path.to_path_buf(),
            format,
            container: media.format,
            duration: media.duration,
            size_bytes: metadata.len(),
        })
    }

    /// Inspect several files, stopping at the first unreadable one
    pub async fn inspect_files(&self, paths: &[PathBuf]) -> VidConvResult<Vec<InspectReport>> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            reports.push(self.inspect_file(path).await?);
        }
        Ok(reports)
    }

    /// Format reports as JSON
    pub fn format_as_json(reports: &[InspectReport]) -> VidConvResult<String> {
        Ok(serde_json::to_string_pretty(reports)?)
    }

    /// Format reports as YAML
    pub fn format_as_yaml(reports: &[InspectReport]) -> VidConvResult<String> {
        Ok(serde_yaml::to_string(reports)?)
    }

    /// Format reports as human-readable text
    pub fn format_as_text(reports: &[InspectReport]) -> String {
        let mut output = String::new();
        for report in reports {
            output.push_str(&format!("File: {}\n", report.path.display()));
            output.push_str(&format!("  Format:    {}\n", report.format));
            output.push_str(&format!("  Container: {}\n", report.container));
            match report.duration {
                Some(duration) => output.push_str(&format!(
                    "  Duration:  {} ({:.2}s)\n",
                    format_seconds(duration),
                    duration
                )),
                None => output.push_str("  Duration:  unknown\n"),
            }
            output.push_str(&format!("  Size:      {}\n", format_file_size(report.size_bytes)));
        }
        output
    }
}
