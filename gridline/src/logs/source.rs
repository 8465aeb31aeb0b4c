//! Log data source abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::entry::{LogFile, RawLogEntry};
use crate::error::SourceError;

/// Receives entries pushed by a live subscription.
pub type LogHandler = Arc<dyn Fn(Vec<RawLogEntry>) + Send + Sync>;

/// A live subscription. Dropping it unsubscribes.
///
/// Sources hand out a [`CancellationToken`] alongside the guard and stop
/// pushing once it is cancelled.
#[derive(Debug)]
pub struct Subscription {
    _guard: DropGuard,
}

impl Subscription {
    /// Create a subscription and the token its source should watch.
    pub fn new() -> (Self, CancellationToken) {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        (Self { _guard: guard }, token)
    }

    /// Unsubscribe now.
    pub fn cancel(self) {}
}

/// Backend serving logs for a [`LogViewer`](super::LogViewer).
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Current entries of a category.
    async fn fetch_logs(&self, category: &str) -> Result<Vec<RawLogEntry>, SourceError>;

    /// Archived log files.
    async fn fetch_archives(&self) -> Result<Vec<LogFile>, SourceError>;

    /// Clear the entries of a category.
    async fn clear_logs(&self, category: &str) -> Result<(), SourceError>;

    /// Contents of an archive.
    async fn download_archive(&self, name: &str) -> Result<Vec<u8>, SourceError>;

    async fn delete_archive(&self, name: &str) -> Result<(), SourceError>;

    /// Push new entries of a category to `handler` until the subscription
    /// is dropped. Sources without a live feed return an inert subscription.
    fn subscribe(&self, category: &str, handler: LogHandler) -> Subscription {
        let _ = (category, handler);
        Subscription::new().0
    }
}
