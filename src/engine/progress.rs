//! Progress tracking and the notification types crossing back to the caller

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use crate::domain::model::{JobId, JobResult, ProgressEvent};
use crate::domain::rules::{percent_complete, TimestampParser};

/// Notification emitted by the batch worker, delivered in generation order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// A job is about to launch the encoder
    JobStarted {
        job: JobId,
        input: PathBuf,
        output: PathBuf,
        /// Known media duration; None means indeterminate progress
        duration: Option<f64>,
    },
    /// Completion estimate for the running job
    Progress(ProgressEvent),
    /// Terminal outcome of a job
    JobFinished(JobResult),
    /// Every job has a result
    BatchFinished { succeeded: usize, failed: usize },
}

/// Sending half of the ordered notification channel
pub type EventSender = mpsc::UnboundedSender<BatchEvent>;

/// Receiving half drained by the caller's display surface
pub type EventReceiver = mpsc::UnboundedReceiver<BatchEvent>;

/// Create the ordered notification channel.
///
/// Unbounded so that sending never stalls the encoder loop; the volume is a
/// handful of events per second of encoding.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Per-job progress state machine.
///
/// Feeds on diagnostic lines and yields percentages that never go backwards.
#[derive(Debug, Clone)]
pub struct JobProgress {
    job: JobId,
    duration: Option<f64>,
    last_percent: Option<f64>,
}

impl JobProgress {
    pub fn new(job: JobId, duration: Option<f64>) -> Self {
        Self {
            job,
            duration,
            last_percent: None,
        }
    }

    /// Whether this job can report percentages at all
    pub fn is_determinate(&self) -> bool {
        percent_complete(0.0, self.duration).is_some()
    }

    /// Consume one diagnostic line, returning an event when progress advanced
    pub fn observe(&mut self, line: &str) -> Option<ProgressEvent> {
        let elapsed = TimestampParser::parse_line(line)?;
        let percent = percent_complete(elapsed, self.duration)?;

        match self.last_percent {
            Some(last) if percent <= last => None,
            _ => {
                self.last_percent = Some(percent);
                Some(ProgressEvent {
                    job: self.job,
                    percent,
                })
            }
        }
    }

    pub fn last_percent(&self) -> Option<f64> {
        self.last_percent
    }
}

/// Bounded ring of the most recent non-progress diagnostic lines
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.into()
    }
}

/// Line reader for ffmpeg's diagnostic stream.
///
/// The stats line is rewritten in place with carriage returns, so both `\r`
/// and `\n` terminate a line here. Invalid UTF-8 is replaced, not rejected.
pub struct DiagnosticLines<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> DiagnosticLines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Next line, or None at end of stream. Empty lines are skipped.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let buf = self.reader.fill_buf().await?;

            if buf.is_empty() {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.take_pending()));
            }

            match buf.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(pos) => {
                    self.pending.extend_from_slice(&buf[..pos]);
                    self.reader.consume(pos + 1);
                    if !self.pending.is_empty() {
                        return Ok(Some(self.take_pending()));
                    }
                }
                None => {
                    let len = buf.len();
                    self.pending.extend_from_slice(buf);
                    self.reader.consume(len);
                }
            }
        }
    }

    fn take_pending(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}
