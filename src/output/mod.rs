//! Batch progress and outcome reporting

pub mod reporter;

pub use reporter::{drain, ConsoleReporter, JsonReporter, ProgressReporter};
