//! FFmpeg execution adapter
//!
//! Runs one conversion job through the ffmpeg CLI, streaming its diagnostic
//! output into progress events, and answers the tool availability check.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::adapters::toml_config::AppConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{CodecSelector, TimestampParser};
use crate::engine::{CancelToken, DiagnosticLines, DiagnosticTail, JobProgress};
use crate::ports::*;

/// How a running ffmpeg process ended up
enum RunOutcome<T> {
    Finished(T),
    Cancelled,
}

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    ffmpeg_path: PathBuf,
    check_timeout: Duration,
    tail_lines: usize,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(
        ffmpeg_path: impl Into<PathBuf>,
        check_timeout: Duration,
        tail_lines: usize,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            check_timeout,
            tail_lines,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            Duration::from_secs(config.tool_check_timeout_secs),
            config.diagnostic_tail_lines,
        )
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Full argument list for a job: input, codec pair, quality, muxer
    /// flags, overwrite, output.
    pub fn build_args(job: &ConversionJob) -> Vec<String> {
        let profile = job.profile();
        let mut args = vec!["-i".to_string(), job.input().to_string_lossy().to_string()];

        args.extend(profile.codec_args());
        args.extend(profile.quality_args());
        args.extend(
            CodecSelector::container_args(job.format())
                .iter()
                .map(|a| a.to_string()),
        );
        args.push("-y".to_string());
        args.push(job.output().to_string_lossy().to_string());

        args
    }

    /// Drive one job to a terminal state
    async fn run(
        &self,
        job: &ConversionJob,
        duration_hint: Option<f64>,
        on_progress: ProgressFn<'_>,
        cancel: &CancelToken,
    ) -> Result<(), DomainError> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        if let Some(parent) = job.output().parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::OutputDir(format!("{}: {}", parent.display(), e)))?;
        }

        let args = Self::build_args(job);
        debug!(job = %job.id(), ffmpeg = %self.ffmpeg_path.display(), ?args, "Spawning ffmpeg");

        let mut std_command = std::process::Command::new(&self.ffmpeg_path);
        // Own process group: a terminal Ctrl+C reaches vidconv only and
        // cancellation goes through the token
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut std_command, 0);

        let mut command = Command::from(std_command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            DomainError::SpawnFailed(format!("{}: {}", self.ffmpeg_path.display(), e))
        })?;

        let mut tail = DiagnosticTail::new(self.tail_lines);
        let outcome = self
            .supervise(&mut child, job, duration_hint, on_progress, cancel, &mut tail)
            .await;

        let status = match outcome {
            Ok(RunOutcome::Finished(status)) => status,
            Ok(RunOutcome::Cancelled) => {
                Self::terminate(&mut child).await;
                Self::discard_partial_output(job.output()).await;
                return Err(DomainError::Cancelled);
            }
            Err(e) => {
                Self::terminate(&mut child).await;
                return Err(e);
            }
        };

        if !status.success() {
            if cancel.is_cancelled() {
                Self::discard_partial_output(job.output()).await;
                return Err(DomainError::Cancelled);
            }
            return Err(DomainError::ToolFailed {
                code: status.code(),
                tail: tail.into_lines(),
            });
        }

        Self::verify_output(job.output()).await
    }

    /// Read the diagnostic stream to its end, then reap the process, racing
    /// both against cancellation.
    async fn supervise(
        &self,
        child: &mut Child,
        job: &ConversionJob,
        duration_hint: Option<f64>,
        on_progress: ProgressFn<'_>,
        cancel: &CancelToken,
        tail: &mut DiagnosticTail,
    ) -> Result<RunOutcome<ExitStatus>, DomainError> {
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| {
                DomainError::StreamFailed("diagnostic stream not captured".to_string())
            })?;

        let mut lines = DiagnosticLines::new(stderr);
        let mut progress = JobProgress::new(job.id(), duration_hint);
        if !progress.is_determinate() {
            debug!(job = %job.id(), "Duration unknown, progress is indeterminate");
        }

        let read_loop = async {
            while let Some(line) = lines.next_line().await? {
                if TimestampParser::parse_line(&line).is_some() {
                    if let Some(event) = progress.observe(&line) {
                        on_progress(event);
                    }
                } else {
                    tail.push(&line);
                }
            }
            Ok::<(), std::io::Error>(())
        };

        let drained = tokio::select! {
            biased;
            _ = cancel.cancelled() => RunOutcome::Cancelled,
            result = read_loop => RunOutcome::Finished(result),
        };

        match drained {
            RunOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
            RunOutcome::Finished(Err(e)) => return Err(DomainError::StreamFailed(e.to_string())),
            RunOutcome::Finished(Ok(())) => {}
        }

        let exited = tokio::select! {
            biased;
            _ = cancel.cancelled() => RunOutcome::Cancelled,
            status = child.wait() => RunOutcome::Finished(status),
        };

        match exited {
            RunOutcome::Finished(Ok(status)) => Ok(RunOutcome::Finished(status)),
            RunOutcome::Finished(Err(e)) => Err(DomainError::StreamFailed(e.to_string())),
            RunOutcome::Cancelled => Ok(RunOutcome::Cancelled),
        }
    }

    /// Kill and reap; the process may already be gone
    async fn terminate(child: &mut Child) {
        if let Err(e) = child.kill().await {
            debug!("ffmpeg already exited: {}", e);
        }
    }

    async fn discard_partial_output(output: &Path) {
        match tokio::fs::remove_file(output).await {
            Ok(()) => debug!(path = %output.display(), "Removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %output.display(), "Could not remove partial output: {}", e),
        }
    }

    /// Exit code zero is not enough; the file must exist and hold data
    async fn verify_output(output: &Path) -> Result<(), DomainError> {
        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
            Ok(_) => Err(DomainError::EmptyOutput(output.display().to_string())),
            Err(_) => Err(DomainError::MissingOutput(output.display().to_string())),
        }
    }
}

#[async_trait]
impl ToolPort for FFmpegAdapter {
    async fn is_available(&self) -> bool {
        let mut command = Command::new(&self.ffmpeg_path);
        command
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.check_timeout, command.status()).await {
            Ok(Ok(status)) => {
                debug!(ffmpeg = %self.ffmpeg_path.display(), ?status, "Version query finished");
                status.success()
            }
            Ok(Err(e)) => {
                debug!(ffmpeg = %self.ffmpeg_path.display(), "ffmpeg not invocable: {}", e);
                false
            }
            Err(_) => {
                warn!(
                    ffmpeg = %self.ffmpeg_path.display(),
                    "Version query timed out after {:?}",
                    self.check_timeout
                );
                false
            }
        }
    }
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    async fn convert(
        &self,
        job: &ConversionJob,
        duration_hint: Option<f64>,
        on_progress: ProgressFn<'_>,
        cancel: &CancelToken,
    ) -> JobResult {
        let started = Instant::now();
        info!(
            job = %job.id(),
            input = %job.input().display(),
            format = %job.format(),
            "Converting"
        );

        let outcome = self.run(job, duration_hint, on_progress, cancel).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!(
                    job = %job.id(),
                    output = %job.output().display(),
                    elapsed_ms,
                    "Conversion succeeded"
                );
                JobResult::succeeded(job, elapsed_ms)
            }
            Err(e) if e.is_cancelled() => {
                info!(job = %job.id(), "Conversion cancelled");
                JobResult::failed(job, &e, elapsed_ms)
            }
            Err(e) => {
                warn!(job = %job.id(), "Conversion failed: {}", e);
                JobResult::failed(job, &e, elapsed_ms)
            }
        }
    }
}
