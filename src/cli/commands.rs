//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::app::{AppContainer, BatchInteractor, InspectInteractor};
use crate::cli::args::{ConvertArgs, FormatsArgs, InspectArgs, InspectOutput};
use crate::cli::ToolCommand;
use crate::domain::model::SUPPORTED_INPUT_EXTENSIONS;
use crate::engine::{event_channel, CancelToken};
use crate::error::VidConvError;
use crate::output::{drain, ConsoleReporter, JsonReporter};

/// Execute the convert command.
///
/// Returns whether every job succeeded.
pub async fn convert(
    container: &dyn AppContainer,
    config: &AppConfig,
    args: ConvertArgs,
) -> Result<bool> {
    info!("Starting convert operation");

    if !container.is_tool_available().await {
        return Err(VidConvError::ToolUnavailable {
            path: config.ffmpeg_path.clone(),
        }
        .into());
    }

    let format = args.format.unwrap_or(config.default_format);
    let jobs = BatchInteractor::plan_jobs(&args.inputs, &args.output_dir, format)
        .context("Failed to plan conversion")?;
    let total = jobs.len();
    info!(jobs = total, %format, output_dir = %args.output_dir.display(), "Submitting batch");

    let cancel = CancelToken::new();
    let (events, mut receiver) = event_channel();
    let worker = container.submit_batch(jobs, events, cancel.clone());

    let interrupt = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling batch");
            interrupt.cancel();
        }
    });

    let reported = if args.json {
        drain(&mut receiver, &mut JsonReporter::new(std::io::stdout())).await
    } else {
        drain(&mut receiver, &mut ConsoleReporter::new(std::io::stdout(), total)).await
    };

    let batch = worker.await.context("Batch worker stopped unexpectedly")?;
    ctrl_c.abort();
    reported.context("Failed to write progress")?;

    info!(
        succeeded = batch.succeeded(),
        failed = batch.failed(),
        "Convert operation completed"
    );
    if cancel.is_cancelled() {
        return Err(VidConvError::Cancelled.into());
    }
    Ok(batch.is_all_succeeded())
}

/// Execute the inspect command
pub async fn inspect(container: &dyn AppContainer, args: InspectArgs) -> Result<bool> {
    info!("Starting inspect operation");

    let reports = container
        .inspect_interactor()
        .inspect_files(&args.files)
        .await
        .context("Failed to inspect input")?;

    match args.output {
        InspectOutput::Text => print!("{}", InspectInteractor::format_as_text(&reports)),
        InspectOutput::Json => println!("{}", InspectInteractor::format_as_json(&reports)?),
        InspectOutput::Yaml => print!("{}", InspectInteractor::format_as_yaml(&reports)?),
    }

    Ok(true)
}

/// Execute the formats command
pub fn formats(container: &dyn AppContainer, args: FormatsArgs) -> Result<bool> {
    if args.inputs {
        for ext in SUPPORTED_INPUT_EXTENSIONS {
            println!("{}", ext);
        }
    } else {
        for format in container.list_supported_formats() {
            println!("{}", format);
        }
    }
    Ok(true)
}

/// Print the effective configuration as TOML
pub fn show_config(config: &AppConfig) -> Result<bool> {
    print!("{}", TomlConfigAdapter::serialize(config)?);
    Ok(true)
}

/// Execute the tool subcommands
pub async fn tool(
    container: &dyn AppContainer,
    config: &AppConfig,
    command: ToolCommand,
) -> Result<bool> {
    let ffmpeg = config.ffmpeg_path.display();

    match command {
        ToolCommand::Check => {
            if container.is_tool_available().await {
                println!("ffmpeg is available ({})", ffmpeg);
                Ok(true)
            } else {
                println!("ffmpeg is not available ({})", ffmpeg);
                Ok(false)
            }
        }
        ToolCommand::Install => {
            if container.is_tool_available().await {
                println!("ffmpeg is already installed ({})", ffmpeg);
                return Ok(true);
            }

            info!("Installing ffmpeg");
            if !container.acquire_tool().await {
                return Err(VidConvError::AcquisitionFailed {
                    message: "no package manager could install it; install ffmpeg manually"
                        .to_string(),
                }
                .into());
            }

            if container.is_tool_available().await {
                println!("ffmpeg installed");
                Ok(true)
            } else {
                println!(
                    "ffmpeg was installed but is not on PATH yet; open a new shell or pass --ffmpeg"
                );
                Ok(false)
            }
        }
    }
}
