//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter, LOCAL_CONFIG_FILE};
use crate::cli::Cli;
use crate::domain::model::TargetFormat;
use crate::error::{VidConvError, VidConvResult};

/// Environment variables mapped onto config fields
pub const ENV_FFMPEG_PATH: &str = "VIDCONV_FFMPEG_PATH";
pub const ENV_FFPROBE_PATH: &str = "VIDCONV_FFPROBE_PATH";
pub const ENV_LOG_LEVEL: &str = "VIDCONV_LOG_LEVEL";
pub const ENV_DEFAULT_FORMAT: &str = "VIDCONV_DEFAULT_FORMAT";
pub const ENV_PROBE_TIMEOUT: &str = "VIDCONV_PROBE_TIMEOUT";
pub const ENV_TOOL_TIMEOUT: &str = "VIDCONV_TOOL_TIMEOUT";

/// Where the effective configuration came from.
///
/// Resolution runs before the tracing subscriber exists, so it is recorded
/// here and logged once logging is up.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOrigin {
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: Vec<&'static str>,
}

impl ConfigOrigin {
    pub fn log(&self, config: &AppConfig) {
        match &self.file {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => debug!("No configuration file found, using defaults"),
        }
        if self.env_overrides > 0 {
            info!("Applied {} environment variable overrides", self.env_overrides);
        }
        for field in &self.cli_overrides {
            info!("CLI override: {}", field);
        }
        debug!(?config, "Configuration resolved");
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(
    cli: &Cli,
) -> VidConvResult<(AppConfig, ConfigOrigin)> {
    // Step 1 and 2: defaults, overlaid by the first config file found
    let (mut config, file) = load_config_file(cli.config.as_deref())?;

    // Step 3: environment
    let env_overrides = apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    // Step 4: command line
    let cli_overrides = apply_cli_overrides(&mut config, cli);

    TomlConfigAdapter::validate(&config)?;
    Ok((
        config,
        ConfigOrigin {
            file,
            env_overrides,
            cli_overrides,
        },
    ))
}

/// Candidate files, most specific first
fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => vec![
            PathBuf::from(LOCAL_CONFIG_FILE),
            TomlConfigAdapter::default_config_path(),
        ],
    }
}

/// Load the first existing config file, or defaults.
///
/// An explicitly requested file must exist.
fn load_config_file(explicit: Option<&Path>) -> VidConvResult<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(VidConvError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    }

    for path in config_candidates(explicit) {
        if let Some(config) = TomlConfigAdapter::load(&path)? {
            return Ok((config, Some(path)));
        }
    }

    Ok((AppConfig::default(), None))
}

/// Overlay `VIDCONV_*` variables; returns how many were applied.
///
/// `lookup` abstracts the environment so the mapping can be tested.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> VidConvResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    if let Some(value) = lookup(ENV_FFMPEG_PATH) {
        config.ffmpeg_path = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = lookup(ENV_FFPROBE_PATH) {
        config.ffprobe_path = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        config.log_level = value;
        applied += 1;
    }
    if let Some(value) = lookup(ENV_DEFAULT_FORMAT) {
        config.default_format = TargetFormat::parse(&value).map_err(|e| {
            VidConvError::config(format!("{}: {}", ENV_DEFAULT_FORMAT, e))
        })?;
        applied += 1;
    }
    if let Some(value) = lookup(ENV_PROBE_TIMEOUT) {
        config.probe_timeout_secs = parse_secs(ENV_PROBE_TIMEOUT, &value)?;
        applied += 1;
    }
    if let Some(value) = lookup(ENV_TOOL_TIMEOUT) {
        config.tool_check_timeout_secs = parse_secs(ENV_TOOL_TIMEOUT, &value)?;
        applied += 1;
    }

    Ok(applied)
}

fn parse_secs(key: &str, value: &str) -> VidConvResult<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        VidConvError::config(format!("{} must be a whole number of seconds, got '{}'", key, value))
    })
}

/// Apply CLI argument overrides; returns the overridden field names
fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> Vec<&'static str> {
    let mut applied = Vec::new();
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.ffmpeg_path = ffmpeg.clone();
        applied.push("ffmpeg_path");
    }
    if let Some(ffprobe) = &cli.ffprobe {
        config.ffprobe_path = ffprobe.clone();
        applied.push("ffprobe_path");
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
        applied.push("log_level");
    }
    applied
}
