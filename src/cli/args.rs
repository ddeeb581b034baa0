//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::model::TargetFormat;

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input video files or directories (directories are scanned recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Folder receiving the converted files (created if missing)
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Output format: mp4, avi, mov, mkv, webm, flv, wmv, m4v (default from config)
    #[arg(short, long)]
    pub format: Option<TargetFormat>,

    /// Emit JSON lines instead of human-readable progress
    #[arg(long)]
    pub json: bool,
}

/// Output rendering for the inspect command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectOutput {
    Text,
    Json,
    Yaml,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output rendering
    #[arg(long, value_enum, default_value_t = InspectOutput::Text)]
    pub output: InspectOutput,
}

/// Arguments for the formats command
#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// List accepted input extensions instead of output formats
    #[arg(long)]
    pub inputs: bool,
}
