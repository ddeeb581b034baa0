// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::model::TargetFormat;
use crate::error::{VidConvError, VidConvResult};

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "vidconv.toml";

/// Effective application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ffmpeg binary, bare name resolves through PATH
    pub ffmpeg_path: PathBuf,
    /// ffprobe binary, bare name resolves through PATH
    pub ffprobe_path: PathBuf,
    /// Budget for the `-version` availability check
    pub tool_check_timeout_secs: u64,
    /// Budget for a single ffprobe call
    pub probe_timeout_secs: u64,
    /// Output format when none is given on the command line
    pub default_format: TargetFormat,
    pub log_level: String,
    /// Diagnostic lines kept for failure messages
    pub diagnostic_tail_lines: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            tool_check_timeout_secs: 10,
            probe_timeout_secs: 30,
            default_format: TargetFormat::Mp4,
            log_level: "info".to_string(),
            diagnostic_tail_lines: 20,
        }
    }
}

/// On-disk layout: everything lives under a `[vidconv]` table
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    vidconv: AppConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Per-user config file location
    pub fn default_config_path() -> PathBuf {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("VidConv").join("config.toml");
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("vidconv").join("config.toml");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("vidconv")
                .join("config.toml");
        }
        PathBuf::from(LOCAL_CONFIG_FILE)
    }

    /// Parse config from a TOML string
    pub fn parse(toml_content: &str) -> VidConvResult<AppConfig> {
        let file: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| VidConvError::config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.vidconv)
    }

    /// Load config from a file; Ok(None) when the file does not exist
    pub fn load(path: &Path) -> VidConvResult<Option<AppConfig>> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            VidConvError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content).map(Some)
    }

    /// Serialize config to a TOML string
    pub fn serialize(config: &AppConfig) -> VidConvResult<String> {
        let file = ConfigFile {
            vidconv: config.clone(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| VidConvError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Reject values the rest of the program cannot work with
    pub fn validate(config: &AppConfig) -> VidConvResult<()> {
        if config.tool_check_timeout_secs == 0 {
            return Err(VidConvError::config("tool_check_timeout_secs must be positive"));
        }
        if config.probe_timeout_secs == 0 {
            return Err(VidConvError::config("probe_timeout_secs must be positive"));
        }
        if config.ffmpeg_path.as_os_str().is_empty() || config.ffprobe_path.as_os_str().is_empty()
        {
            return Err(VidConvError::config("tool paths cannot be empty"));
        }
        match config.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(VidConvError::config(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.tool_check_timeout_secs, 10);
        assert_eq!(config.probe_timeout_secs, 30);
        assert_eq!(config.default_format, TargetFormat::Mp4);
        assert!(TomlConfigAdapter::validate(&config).is_ok());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
            [vidconv]
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            default_format = "webm"
            "#,
        )
        .unwrap();

        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.default_format, TargetFormat::Webm);
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.probe_timeout_secs, 30);
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(TomlConfigAdapter::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        let err = TomlConfigAdapter::parse("[vidconv]\ndefault_format = \"gif\"\n").unwrap_err();
        assert!(matches!(err, VidConvError::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AppConfig {
            probe_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(TomlConfigAdapter::validate(&config).is_err());

        let config = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(TomlConfigAdapter::validate(&config).is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(TomlConfigAdapter::load(&path).unwrap(), None);

        let config = AppConfig {
            default_format: TargetFormat::Mkv,
            diagnostic_tail_lines: 5,
            ..AppConfig::default()
        };
        std::fs::write(&path, TomlConfigAdapter::serialize(&config).unwrap()).unwrap();

        assert_eq!(TomlConfigAdapter::load(&path).unwrap(), Some(config));
    }
}
