// Batch interactor - Plans jobs and runs them one at a time

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::model::*;
use crate::engine::{BatchEvent, CancelToken, EventSender};
use crate::error::{VidConvError, VidConvResult};
use crate::ports::*;
use crate::utils::PathUtils;

/// Interactor for the batch conversion use case
pub struct BatchInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
}

impl BatchInteractor {
    /// Create new batch interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>, execute_port: Arc<dyn ExecutePort>) -> Self {
        Self {
            probe_port,
            execute_port,
        }
    }

    /// Turn the user's selection into immutable jobs.
    ///
    /// Directories expand to the video files below them. Every input must be
    /// a readable file and every output path must be distinct from its input
    /// and from the other outputs. The output folder is created last.
    pub fn plan_jobs(
        inputs: &[PathBuf],
        output_dir: &Path,
        format: TargetFormat,
    ) -> VidConvResult<Vec<ConversionJob>> {
        let files = PathUtils::collect_inputs(inputs)?;
        if files.is_empty() {
            return Err(VidConvError::invalid_job("No video files found in the given inputs"));
        }

        let output_dir = PathUtils::absolutize(output_dir)?;
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut jobs = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let input = PathUtils::absolutize(file)?;
            if !input.is_file() {
                return Err(VidConvError::invalid_job(format!(
                    "Input file not found: {}",
                    input.display()
                )));
            }
            std::fs::File::open(&input).map_err(|e| {
                VidConvError::invalid_job(format!("Cannot read {}: {}", input.display(), e))
            })?;

            let output = PathUtils::output_path_for(&input, &output_dir, format)?;
            if output == input {
                return Err(VidConvError::invalid_job(format!(
                    "Converting {} would overwrite it; choose another output folder",
                    input.display()
                )));
            }
            if let Some(previous) = claimed.insert(output.clone(), input.clone()) {
                return Err(VidConvError::invalid_job(format!(
                    "{} and {} would both be written to {}",
                    previous.display(),
                    input.display(),
                    output.display()
                )));
            }

            jobs.push(ConversionJob::new(JobId(index + 1), input, output, format));
        }

        std::fs::create_dir_all(&output_dir).map_err(|e| {
            VidConvError::invalid_job(format!(
                "Cannot create output folder {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        debug!(count = jobs.len(), output_dir = %output_dir.display(), "Planned jobs");
        Ok(jobs)
    }

    /// Run every job in order and return one result per job, in job order.
    ///
    /// Progress and outcomes are pushed to `events` as they happen. Once
    /// `cancel` fires, the running job is stopped and every job not yet
    /// started is recorded as cancelled.
    pub async fn run(
        &self,
        jobs: &[ConversionJob],
        events: &EventSender,
        cancel: &CancelToken,
    ) -> BatchResult {
        info!(jobs = jobs.len(), "Starting batch");
        let mut results = Vec::with_capacity(jobs.len());

        for (index, job) in jobs.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(remaining = jobs.len() - index, "Batch cancelled");
                for pending in &jobs[index..] {
                    let result = JobResult::cancelled(pending);
                    emit(events, BatchEvent::JobFinished(result.clone()));
                    results.push(result);
                }
                break;
            }

            let result = self.run_job(job, events, cancel).await;
            emit(events, BatchEvent::JobFinished(result.clone()));
            results.push(result);
        }

        debug_assert_eq!(results.len(), jobs.len());

        let batch = BatchResult::new(results);
        info!(succeeded = batch.succeeded(), failed = batch.failed(), "Batch finished");
        emit(
            events,
            BatchEvent::BatchFinished {
                succeeded: batch.succeeded(),
                failed: batch.failed(),
            },
        );
        batch
    }

    async fn run_job(
        &self,
        job: &ConversionJob,
        events: &EventSender,
        cancel: &CancelToken,
    ) -> JobResult {
        let media = self.probe_port.probe(job.input()).await;
        if !media.has_duration() {
            debug!(job = %job.id(), "No duration for {}", job.display_name());
        }

        emit(
            events,
            BatchEvent::JobStarted {
                job: job.id(),
                input: job.input().to_path_buf(),
                output: job.output().to_path_buf(),
                duration: media.duration,
            },
        );

        let sink = events.clone();
        let on_progress = move |event: ProgressEvent| emit(&sink, BatchEvent::Progress(event));

        self.execute_port
            .convert(job, media.duration, &on_progress, cancel)
            .await
    }
}

/// The receiver may be gone when the caller stopped listening; the batch
/// still runs to completion.
fn emit(events: &EventSender, event: BatchEvent) {
    if events.send(event).is_err() {
        debug!("Batch event dropped, receiver closed");
    }
}
