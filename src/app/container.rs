use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::adapters::{AppConfig, FFmpegAdapter, FFprobeAdapter, PackageManagerAdapter};
use crate::app::{batch_interactor::BatchInteractor, inspect_interactor::InspectInteractor};
use crate::domain::model::{BatchResult, ConversionJob, TargetFormat};
use crate::engine::{CancelToken, EventSender};
use crate::ports::{AcquirePort, ExecutePort, ProbePort, ToolPort};

/// Surface offered to front-ends (the CLI here)
#[async_trait]
pub trait AppContainer: Send + Sync {
    /// Whether ffmpeg answers a version query
    async fn is_tool_available(&self) -> bool;

    /// Try to install ffmpeg
    async fn acquire_tool(&self) -> bool;

    /// Every output format a batch accepts
    fn list_supported_formats(&self) -> Vec<TargetFormat>;

    /// Start a batch on a worker task. Events arrive on `events` while it
    /// runs; the handle resolves to the full result.
    fn submit_batch(
        &self,
        jobs: Vec<ConversionJob>,
        events: EventSender,
        cancel: CancelToken,
    ) -> JoinHandle<BatchResult>;

    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    tool_port: Arc<dyn ToolPort>,
    acquire_port: Arc<dyn AcquirePort>,
    batch_interactor: Arc<BatchInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg, ffprobe and package manager adapters
    pub fn new(config: &AppConfig) -> Self {
        let ffmpeg = Arc::new(FFmpegAdapter::from_config(config));
        let probe_port = Arc::new(FFprobeAdapter::from_config(config));
        let acquire_port = Arc::new(PackageManagerAdapter::new());

        Self::with_ports(
            Arc::clone(&ffmpeg) as Arc<dyn ToolPort>,
            acquire_port as Arc<dyn AcquirePort>,
            probe_port as Arc<dyn ProbePort>,
            ffmpeg as Arc<dyn ExecutePort>,
        )
    }

    pub fn with_ports(
        tool_port: Arc<dyn ToolPort>,
        acquire_port: Arc<dyn AcquirePort>,
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
    ) -> Self {
        let batch_interactor = Arc::new(BatchInteractor::new(
            Arc::clone(&probe_port),
            execute_port,
        ));
        let inspect_interactor = Arc::new(InspectInteractor::new(probe_port));

        Self {
            tool_port,
            acquire_port,
            batch_interactor,
            inspect_interactor,
        }
    }
}

#[async_trait]
impl AppContainer for DefaultAppContainer {
    async fn is_tool_available(&self) -> bool {
        self.tool_port.is_available().await
    }

    async fn acquire_tool(&self) -> bool {
        self.acquire_port.acquire().await
    }

    fn list_supported_formats(&self) -> Vec<TargetFormat> {
        TargetFormat::ALL.to_vec()
    }

    fn submit_batch(
        &self,
        jobs: Vec<ConversionJob>,
        events: EventSender,
        cancel: CancelToken,
    ) -> JoinHandle<BatchResult> {
        let interactor = Arc::clone(&self.batch_interactor);
        tokio::spawn(async move { interactor.run(&jobs, &events, &cancel).await })
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::*;
    use crate::engine::{event_channel, BatchEvent};
    use crate::ports::ProgressFn;
    use std::path::{Path, PathBuf};

    struct Stub;

    #[async_trait]
    impl ToolPort for Stub {
        async fn is_available(&self) -> bool {
            true
        }
    }

    #[async_trait]
    impl AcquirePort for Stub {
        async fn acquire(&self) -> bool {
            false
        }
    }

    #[async_trait]
    impl ProbePort for Stub {
        async fn probe(&self, path: &Path) -> MediaInfo {
            MediaInfo::unknown(path)
        }
    }

    #[async_trait]
    impl ExecutePort for Stub {
        async fn convert(
            &self,
            job: &ConversionJob,
            _duration_hint: Option<f64>,
            _on_progress: ProgressFn<'_>,
            _cancel: &CancelToken,
        ) -> JobResult {
            JobResult::succeeded(job, 0)
        }
    }

    fn container() -> DefaultAppContainer {
        let stub = Arc::new(Stub);
        DefaultAppContainer::with_ports(stub.clone(), stub.clone(), stub.clone(), stub)
    }

    #[tokio::test]
    async fn test_collaborator_surface() {
        let container = container();
        assert!(container.is_tool_available().await);
        assert!(!container.acquire_tool().await);
        assert_eq!(container.list_supported_formats().len(), 8);
    }

    #[tokio::test]
    async fn test_submit_batch_runs_on_worker() {
        let container = container();
        let job = ConversionJob::new(
            JobId(1),
            PathBuf::from("/in/a.mov"),
            PathBuf::from("/out/a.mp4"),
            TargetFormat::Mp4,
        );
        let (tx, mut rx) = event_channel();

        let handle = container.submit_batch(vec![job], tx, CancelToken::new());

        let mut saw_finish = false;
        while let Some(event) = rx.recv().await {
            if matches!(event, BatchEvent::BatchFinished { succeeded: 1, failed: 0 }) {
                saw_finish = true;
            }
        }
        assert!(saw_finish);
        assert!(handle.await.unwrap().is_all_succeeded());
    }
}
