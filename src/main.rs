//! VidConv Batch Video Converter
//!
//! Converts video files to mp4, avi, mov, mkv, webm, flv, wmv or m4v using
//! the ffmpeg found on the system (or installed on request).
//!
//! # Usage
//!
//! ```bash
//! vidconv convert holiday.mov clips/ --output-dir converted --format webm
//! vidconv inspect holiday.mov --output json
//! vidconv tool check
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use vidconv_cli::app::DefaultAppContainer;
use vidconv_cli::cli::{commands, Cli, Commands};
use vidconv_cli::config_initialization::initialize_configuration_hierarchy;
use vidconv_cli::utils::logging::{init_logging, LoggingConfig};

/// Every job succeeded / the check passed
const EXIT_OK: u8 = 0;
/// At least one job failed, or the tool is missing
const EXIT_FAILED: u8 = 1;
/// The command could not run at all
const EXIT_ERROR: u8 = 2;

/// Main entry point for the VidConv CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, origin) = match initialize_configuration_hierarchy(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    init_logging(&LoggingConfig::new(config.log_level.clone(), cli.log_format));
    debug!("Starting VidConv");
    origin.log(&config);

    let container = DefaultAppContainer::new(&config);

    let outcome = match cli.command {
        Commands::Convert(args) => commands::convert(&container, &config, args).await,
        Commands::Inspect(args) => commands::inspect(&container, args).await,
        Commands::Formats(args) => commands::formats(&container, args),
        Commands::Tool(command) => commands::tool(&container, &config, command).await,
        Commands::Config => commands::show_config(&config),
    };

    match outcome {
        Ok(true) => ExitCode::from(EXIT_OK),
        Ok(false) => ExitCode::from(EXIT_FAILED),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
