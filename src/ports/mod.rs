// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::model::*;
use crate::engine::CancelToken;

/// Port for checking that the external media tool can be invoked
#[async_trait]
pub trait ToolPort: Send + Sync {
    /// True only when the tool answers a version query cleanly within the timeout
    async fn is_available(&self) -> bool;
}

/// Port for installing the external media tool
#[async_trait]
pub trait AcquirePort: Send + Sync {
    /// Attempt an installation; true when the tool was installed
    async fn acquire(&self) -> bool;
}

/// Port for media file introspection
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Container label and duration. Never fails: unreadable files yield
    /// `MediaInfo::unknown` so progress degrades to indeterminate.
    async fn probe(&self, path: &Path) -> MediaInfo;
}

/// Progress callback handed to the execution port
pub type ProgressFn<'a> = &'a (dyn Fn(ProgressEvent) + Send + Sync);

/// Port for running a single conversion job
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run one job to completion and report its outcome.
    ///
    /// Always returns a result: spawn, I/O and cancellation faults become
    /// `JobStatus::Failed`. `duration_hint` enables percentage progress.
    async fn convert(
        &self,
        job: &ConversionJob,
        duration_hint: Option<f64>,
        on_progress: ProgressFn<'_>,
        cancel: &CancelToken,
    ) -> JobResult;
}
