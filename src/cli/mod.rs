//! CLI module for VidConv
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::{ConvertArgs, FormatsArgs, InspectArgs, InspectOutput};

/// VidConv batch video converter
///
/// Converts local video files to a chosen container using an installed ffmpeg,
/// reporting per-file progress and outcome.
#[derive(Parser, Debug)]
#[command(name = "vidconv")]
#[command(about = "VidConv - Batch video conversion powered by ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Configuration file (defaults to ./vidconv.toml, then the user config dir)
    #[arg(long, global = true, env = "VIDCONV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert video files to another format
    Convert(args::ConvertArgs),
    /// Show detected container format and duration of files
    Inspect(args::InspectArgs),
    /// List supported output formats
    Formats(args::FormatsArgs),
    /// Check or install the ffmpeg tool
    #[command(subcommand)]
    Tool(ToolCommand),
    /// Print the effective configuration
    Config,
}

/// ffmpeg management commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCommand {
    /// Report whether ffmpeg can be invoked
    Check,
    /// Install ffmpeg through the platform package manager
    Install,
}
