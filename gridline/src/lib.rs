//! Headless table view-state engine.
//!
//! `gridline` manages the interactive layout of a data table (column order,
//! visibility and widths), its data state (pagination, selection, filters)
//! and a streaming log view, independently of any renderer. Layout state is
//! persisted through a pluggable [`store::KeyValueStore`].

pub mod error;
pub mod logs;
pub mod scroll;
pub mod store;
pub mod table;
pub mod toast;

pub use error::*;
pub use logs::{LogEntry, LogFile, LogLevel, LogSource, LogViewer, LogViewerConfig, RawLogEntry};
pub use store::{Aspect, KeyValueStore, MemoryStore, SqliteStore, TableStateStore};
pub use table::{
    Column, DataTable, DataTableOptions, HeaderSpec, Pagination, RowSelection, TableView,
};
pub use toast::Toast;
