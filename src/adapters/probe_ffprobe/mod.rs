//! FFprobe adapter for media file probing
//!
//! Reads container format and duration with `ffprobe -show_format`. Every
//! failure degrades to an unknown-duration `MediaInfo`; nothing here errors.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::adapters::toml_config::AppConfig;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FFprobeAdapter {
    ffprobe_path: PathBuf,
    probe_timeout: Duration,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe_path: impl Into<PathBuf>, probe_timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            probe_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.ffprobe_path.clone(),
            Duration::from_secs(config.probe_timeout_secs),
        )
    }

    /// Parses ffprobe JSON output into MediaInfo.
    ///
    /// The format label is the first entry of ffprobe's comma-separated
    /// demuxer list; a non-numeric duration (e.g. `N/A`) is treated as absent.
    pub fn parse_probe_output(path: &Path, output: &str) -> MediaInfo {
        let probe: ProbeOutput = match serde_json::from_str(output) {
            Ok(probe) => probe,
            Err(e) => {
                debug!(path = %path.display(), "Unparseable ffprobe output: {}", e);
                return MediaInfo::unknown(path);
            }
        };

        let Some(format) = probe.format else {
            return MediaInfo::unknown(path);
        };

        let label = format
            .format_name
            .as_deref()
            .and_then(|name| name.split(',').next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("unknown");

        let duration = format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0);

        MediaInfo {
            path: path.to_path_buf(),
            format: label.to_string(),
            duration,
        }
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, path: &Path) -> MediaInfo {
        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.probe_timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(ffprobe = %self.ffprobe_path.display(), "Could not run ffprobe: {}", e);
                return MediaInfo::unknown(path);
            }
            Err(_) => {
                warn!(path = %path.display(), "ffprobe timed out after {:?}", self.probe_timeout);
                return MediaInfo::unknown(path);
            }
        };

        if !output.status.success() {
            debug!(path = %path.display(), status = ?output.status, "ffprobe failed");
            return MediaInfo::unknown(path);
        }

        let info = Self::parse_probe_output(path, &String::from_utf8_lossy(&output.stdout));
        debug!(path = %path.display(), format = %info.format, duration = ?info.duration, "Probed");
        info
    }
}
