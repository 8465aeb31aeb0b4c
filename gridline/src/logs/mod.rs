//! Streaming log view.
//!
//! Entries arrive by fetch, polling or live push, all through the same
//! [`LogBuffer`] pipeline, and are presented by a [`LogViewer`] handle.

mod entry;
mod pipeline;
mod source;
mod viewer;

pub use entry::{LogEntry, LogFile, LogLevel, RawLogEntry, STACK_KEY};
pub use pipeline::{is_stack_frame, normalize, strip_ansi, LogBuffer};
pub use source::{LogHandler, LogSource, Subscription};
pub use viewer::{
    ExportFormat, LogViewer, LogViewerConfig, DEFAULT_MAX_ENTRIES, DEFAULT_POLL_INTERVAL,
};
