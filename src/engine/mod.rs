//! Conversion engine support: progress parsing, event channel, cancellation

pub mod cancel;
pub mod progress;

pub use cancel::CancelToken;
pub use progress::{
    event_channel, BatchEvent, DiagnosticLines, DiagnosticTail, EventReceiver, EventSender,
    JobProgress,
};
