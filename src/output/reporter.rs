//! Reporters rendering batch events on the caller's side of the channel

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::domain::model::{JobId, JobResult};
use crate::engine::{BatchEvent, EventReceiver};
use crate::utils::time::format_elapsed;

/// Sink for batch events, called in arrival order
pub trait ProgressReporter {
    fn report(&mut self, event: &BatchEvent) -> io::Result<()>;
}

/// Consume events until the batch worker hangs up
pub async fn drain(
    receiver: &mut EventReceiver,
    reporter: &mut dyn ProgressReporter,
) -> io::Result<()> {
    while let Some(event) = receiver.recv().await {
        reporter.report(&event)?;
    }
    Ok(())
}

/// Human-readable progress lines.
///
/// Percentages are printed when they cross a 10% step so that logs of
/// long encodes stay readable.
pub struct ConsoleReporter<W: Write> {
    out: W,
    total: usize,
    names: HashMap<JobId, String>,
    last_step: HashMap<JobId, u32>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            names: HashMap::new(),
            last_step: HashMap::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn name(&self, job: JobId) -> String {
        self.names
            .get(&job)
            .cloned()
            .unwrap_or_else(|| job.to_string())
    }

    fn finished(&mut self, result: &JobResult) -> io::Result<()> {
        let name = result
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| result.job.to_string());
        let elapsed = format_elapsed(Duration::from_millis(result.elapsed_ms));

        if result.is_success() {
            writeln!(
                self.out,
                "✓ {} -> {} ({})",
                name,
                result.output.display(),
                elapsed
            )
        } else {
            let message = result.message.as_deref().unwrap_or("failed");
            writeln!(self.out, "✗ {}: {}", name, message)
        }
    }
}

impl<W: Write> ProgressReporter for ConsoleReporter<W> {
    fn report(&mut self, event: &BatchEvent) -> io::Result<()> {
        match event {
            BatchEvent::JobStarted {
                job,
                input,
                output,
                duration,
            } => {
                let name = input
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| input.display().to_string());
                write!(
                    self.out,
                    "[{}/{}] Converting {} -> {}",
                    job.0,
                    self.total,
                    name,
                    output.display()
                )?;
                if duration.is_none() {
                    write!(self.out, " (progress unavailable)")?;
                }
                writeln!(self.out)?;
                self.names.insert(*job, name);
                Ok(())
            }
            BatchEvent::Progress(progress) => {
                let step = (progress.percent / 10.0).floor() as u32;
                let last = self.last_step.insert(progress.job, step);
                if last.map_or(true, |last| step > last) {
                    let name = self.name(progress.job);
                    writeln!(self.out, "    {}: {:.0}%", name, progress.percent)?;
                }
                Ok(())
            }
            BatchEvent::JobFinished(result) => self.finished(result),
            BatchEvent::BatchFinished { succeeded, failed } => {
                writeln!(self.out, "Done: {} succeeded, {} failed", succeeded, failed)?;
                self.out.flush()
            }
        }
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a BatchEvent,
}

/// One JSON object per event, RFC 3339 timestamped
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressReporter for JsonReporter<W> {
    fn report(&mut self, event: &BatchEvent) -> io::Result<()> {
        let line = JsonLine {
            timestamp: Utc::now().to_rfc3339(),
            event,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
