//! VidConv Batch Video Converter Library
//!
//! Converts local video files between container formats by driving an
//! installed ffmpeg, with streamed per-file progress and cancellable batches.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    BatchResult, ConversionJob, JobId, JobResult, JobStatus, MediaInfo, ProgressEvent,
    TargetFormat,
};
pub use engine::{BatchEvent, CancelToken};
pub use error::{VidConvError, VidConvResult};
