//! Streaming log view state.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::{CancellationToken, DropGuard};

use super::entry::{LogEntry, LogFile, LogLevel, RawLogEntry};
use super::pipeline::LogBuffer;
use super::source::{LogHandler, LogSource, Subscription};
use crate::scroll::{ScrollRequest, ScrollState};
use crate::toast::Toast;

/// Default interval between polling refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default live buffer size.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

// =============================================================================
// LogViewerConfig
// =============================================================================

/// Configuration for a [`LogViewer`].
///
/// # Example
///
/// ```ignore
/// let config = LogViewerConfig::default()
///     .with_category("api")
///     .with_max_entries(Some(500))
///     .with_newest_first(true);
/// ```
#[derive(Debug, Clone)]
pub struct LogViewerConfig {
    /// Category shown first.
    pub category: String,
    /// Keep at most this many entries; `None` keeps everything.
    pub max_entries: Option<usize>,
    /// Present the newest entry first.
    pub newest_first: bool,
    /// Scroll to the newest entry after every update.
    pub follow: bool,
    pub poll_interval: Duration,
}

impl Default for LogViewerConfig {
    fn default() -> Self {
        Self {
            category: "default".to_string(),
            max_entries: Some(DEFAULT_MAX_ENTRIES),
            newest_first: false,
            follow: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl LogViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_newest_first(mut self, newest_first: bool) -> Self {
        self.newest_first = newest_first;
        self
    }

    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Export format for [`LogViewer::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One rendered line per entry, stack frames below.
    Text,
    /// One JSON object per line.
    JsonLines,
}

// =============================================================================
// State
// =============================================================================

#[derive(Debug)]
struct ViewState {
    buffer: LogBuffer,
    category: String,
    loading: bool,
    follow: bool,
    newest_first: bool,
    paused: bool,
    /// Live entries held back while paused.
    pending: Vec<RawLogEntry>,
    /// Empty means every level.
    levels: BTreeSet<LogLevel>,
    search: String,
    scroll: ScrollState,
    archives: Vec<LogFile>,
    archives_latched: bool,
    archives_loading: bool,
    toasts: Vec<Toast>,
}

impl ViewState {
    fn visible(&self) -> Vec<&LogEntry> {
        let query = self.search.trim().to_lowercase();
        let mut entries: Vec<&LogEntry> = self
            .buffer
            .entries()
            .iter()
            .filter(|e| self.levels.is_empty() || self.levels.contains(&e.level))
            .filter(|e| query.is_empty() || e.contains(&query))
            .collect();
        if self.newest_first {
            entries.reverse();
        }
        entries
    }

    fn ingest(&mut self, raws: Vec<RawLogEntry>) {
        self.buffer.extend(raws, &self.category);
        self.updated();
    }

    /// Queue a follow scroll to the newest visible entry.
    fn updated(&mut self) {
        if !self.follow {
            return;
        }
        let len = self.visible().len();
        if len > 0 {
            let newest = if self.newest_first { 0 } else { len - 1 };
            self.scroll.request(ScrollRequest::IntoView(newest));
        }
    }
}

struct Shared {
    source: Arc<dyn LogSource>,
    poll_interval: Duration,
    /// Bumped whenever in-flight fetches must be ignored.
    generation: AtomicU64,
    /// Archive lists are not per category, so only shutdown bumps this.
    archive_generation: AtomicU64,
    state: Mutex<ViewState>,
    subscription: Mutex<Option<Subscription>>,
    polling: Mutex<Option<DropGuard>>,
}

// =============================================================================
// LogViewer
// =============================================================================

/// Handle to a streaming log view.
///
/// Cheap to clone; clones share state. Fetch, poll and live push all run
/// their pipeline pass under the same lock. Polling and the live
/// subscription stop when the last handle is dropped.
#[derive(Clone)]
pub struct LogViewer {
    shared: Arc<Shared>,
}

impl fmt::Debug for LogViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogViewer")
            .field("category", &self.category())
            .field("generation", &self.generation())
            .field("polling", &self.is_polling())
            .finish_non_exhaustive()
    }
}

impl LogViewer {
    pub fn new(source: Arc<dyn LogSource>, config: LogViewerConfig) -> Self {
        let state = ViewState {
            buffer: LogBuffer::new(config.max_entries),
            category: config.category,
            loading: false,
            follow: config.follow,
            newest_first: config.newest_first,
            paused: false,
            pending: Vec::new(),
            levels: BTreeSet::new(),
            search: String::new(),
            scroll: ScrollState::new(),
            archives: Vec::new(),
            archives_latched: false,
            archives_loading: false,
            toasts: Vec::new(),
        };
        Self {
            shared: Arc::new(Shared {
                source,
                poll_interval: config.poll_interval,
                generation: AtomicU64::new(0),
                archive_generation: AtomicU64::new(0),
                state: Mutex::new(state),
                subscription: Mutex::new(None),
                polling: Mutex::new(None),
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> Option<R> {
        match self.shared.state.lock() {
            Ok(mut state) => Some(f(&mut *state)),
            Err(_) => {
                log::warn!("[logs] view state poisoned");
                None
            }
        }
    }

    fn bump_generation(&self) -> u64 {
        self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current fetch generation.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Fetch the current category and replace the entries.
    ///
    /// A response that arrives after a category switch or shutdown is
    /// discarded. Failures are logged and leave the entries unchanged.
    pub async fn refresh(&self) {
        let generation = self.generation();
        let Some(category) = self.with_state(|s| {
            s.loading = true;
            s.category.clone()
        }) else {
            return;
        };

        let result = self.shared.source.fetch_logs(&category).await;

        if self.generation() != generation {
            log::debug!("[logs] discarding stale response for {category}");
            return;
        }

        self.with_state(|s| {
            s.loading = false;
            match result {
                Ok(raws) => {
                    log::debug!("[logs] fetched {} entries for {category}", raws.len());
                    s.buffer.replace(raws, &category);
                    s.updated();
                }
                Err(e) => log::warn!("[logs] failed to fetch {category}: {e}"),
            }
        });
    }

    /// Switch category, clear the entries and fetch the new ones.
    pub async fn set_category(&self, category: impl Into<String>) {
        let category = category.into();
        self.bump_generation();
        self.with_state(|s| {
            s.category = category;
            s.buffer.clear();
            s.pending.clear();
            s.scroll = ScrollState::new();
        });
        if self.is_live() {
            self.subscribe_live();
        }
        self.refresh().await;
    }

    pub fn category(&self) -> String {
        self.with_state(|s| s.category.clone()).unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|s| s.loading).unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Live ingestion
    // -------------------------------------------------------------------------

    /// Ingest pushed entries. Held back while paused.
    pub fn push(&self, raws: Vec<RawLogEntry>) {
        self.with_state(|s| {
            if s.paused {
                s.pending.extend(raws);
            } else {
                s.ingest(raws);
            }
        });
    }

    /// Subscribe to the source's live feed for the current category.
    ///
    /// Replaces any existing subscription.
    pub fn subscribe_live(&self) {
        let generation = self.generation();
        let weak = Arc::downgrade(&self.shared);
        let handler: LogHandler = Arc::new(move |raws| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if shared.generation.load(Ordering::SeqCst) == generation {
                LogViewer { shared }.push(raws);
            }
        });

        let category = self.category();
        // Drop the old subscription before opening the new one.
        self.unsubscribe_live();
        let subscription = self.shared.source.subscribe(&category, handler);
        if let Ok(mut slot) = self.shared.subscription.lock() {
            *slot = Some(subscription);
        }
        log::debug!("[logs] subscribed to {category}");
    }

    pub fn unsubscribe_live(&self) {
        if let Ok(mut slot) = self.shared.subscription.lock() {
            slot.take();
        }
    }

    pub fn is_live(&self) -> bool {
        self.shared
            .subscription
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Hold back live entries until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.with_state(|s| s.paused = true);
    }

    /// Resume ingestion, applying everything held back.
    pub fn resume(&self) {
        self.with_state(|s| {
            s.paused = false;
            let pending = std::mem::take(&mut s.pending);
            if !pending.is_empty() {
                s.ingest(pending);
            }
        });
    }

    pub fn is_paused(&self) -> bool {
        self.with_state(|s| s.paused).unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Polling
    // -------------------------------------------------------------------------

    /// Refresh every poll interval until stopped. Ticks are skipped while
    /// paused.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_polling(&self) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak = Arc::downgrade(&self.shared);
        let interval = self.shared.poll_interval;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                let viewer = LogViewer { shared };
                if !viewer.is_paused() {
                    viewer.refresh().await;
                }
            }
            log::debug!("[logs] polling stopped");
        });

        if let Ok(mut slot) = self.shared.polling.lock() {
            // Replacing a guard cancels the previous task.
            *slot = Some(token.drop_guard());
        }
    }

    pub fn stop_polling(&self) {
        if let Ok(mut slot) = self.shared.polling.lock() {
            slot.take();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.shared
            .polling
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Stop polling and the live feed, and ignore every in-flight fetch.
    pub fn shutdown(&self) {
        self.bump_generation();
        self.shared.archive_generation.fetch_add(1, Ordering::SeqCst);
        self.stop_polling();
        self.unsubscribe_live();
        self.with_state(|s| {
            s.loading = false;
            s.archives_loading = false;
        });
    }

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------

    /// Every entry, in presentation order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.with_state(|s| {
            let mut entries = s.buffer.entries().to_vec();
            if s.newest_first {
                entries.reverse();
            }
            entries
        })
        .unwrap_or_default()
    }

    /// Entries passing the level filter and search, in presentation order.
    pub fn visible_entries(&self) -> Vec<LogEntry> {
        self.with_state(|s| s.visible().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.with_state(|s| s.buffer.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn follow(&self) -> bool {
        self.with_state(|s| s.follow).unwrap_or(false)
    }

    /// Enable or disable follow. Enabling scrolls to the newest entry.
    pub fn set_follow(&self, follow: bool) {
        self.with_state(|s| {
            s.follow = follow;
            s.updated();
        });
    }

    pub fn toggle_follow(&self) {
        let follow = self.follow();
        self.set_follow(!follow);
    }

    pub fn newest_first(&self) -> bool {
        self.with_state(|s| s.newest_first).unwrap_or(false)
    }

    pub fn set_newest_first(&self, newest_first: bool) {
        self.with_state(|s| {
            s.newest_first = newest_first;
            s.updated();
        });
    }

    /// Show only these levels. An empty set shows every level.
    pub fn set_levels(&self, levels: impl IntoIterator<Item = LogLevel>) {
        let levels: BTreeSet<LogLevel> = levels.into_iter().collect();
        self.with_state(|s| {
            s.levels = levels;
            s.updated();
        });
    }

    pub fn toggle_level(&self, level: LogLevel) {
        self.with_state(|s| {
            if !s.levels.remove(&level) {
                s.levels.insert(level);
            }
            s.updated();
        });
    }

    pub fn levels(&self) -> Vec<LogLevel> {
        self.with_state(|s| s.levels.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn set_search(&self, query: impl Into<String>) {
        let query = query.into();
        self.with_state(|s| {
            s.search = query;
            s.updated();
        });
    }

    pub fn search(&self) -> String {
        self.with_state(|s| s.search.clone()).unwrap_or_default()
    }

    /// Take the pending scroll request, if any.
    pub fn take_scroll_request(&self) -> Option<ScrollRequest> {
        self.with_state(|s| s.scroll.take_request()).flatten()
    }

    /// Resolve the pending scroll against a viewport height. Returns the
    /// first visible line.
    pub fn resolve_scroll(&self, viewport: usize) -> usize {
        self.with_state(|s| {
            let len = s.visible().len();
            s.scroll.resolve(viewport, len)
        })
        .unwrap_or(0)
    }

    /// Drain queued notifications.
    pub fn take_toasts(&self) -> Vec<Toast> {
        self.with_state(|s| std::mem::take(&mut s.toasts))
            .unwrap_or_default()
    }

    fn toast(&self, toast: Toast) {
        self.with_state(|s| s.toasts.push(toast));
    }

    /// Render the visible entries for download.
    ///
    /// Returns `None` and queues an error toast if serialization fails.
    pub fn export(&self, format: ExportFormat) -> Option<String> {
        let entries = self.visible_entries();
        match format {
            ExportFormat::Text => Some(
                entries
                    .iter()
                    .map(LogEntry::to_text)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            ExportFormat::JsonLines => {
                let lines: Result<Vec<String>, _> =
                    entries.iter().map(serde_json::to_string).collect();
                match lines {
                    Ok(lines) => Some(lines.join("\n")),
                    Err(e) => {
                        log::warn!("[logs] export failed: {e}");
                        self.toast(Toast::error(format!("Export failed: {e}")));
                        None
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Source actions
    // -------------------------------------------------------------------------

    /// Clear the current category at the source, then locally.
    ///
    /// The local entries are kept when the category changed meanwhile.
    pub async fn clear_logs(&self) -> bool {
        let generation = self.generation();
        let category = self.category();
        match self.shared.source.clear_logs(&category).await {
            Ok(()) => {
                let current = self.generation() == generation;
                self.with_state(|s| {
                    if current {
                        s.buffer.clear();
                        s.pending.clear();
                    }
                    s.toasts.push(Toast::success("Logs cleared"));
                });
                true
            }
            Err(e) => {
                log::warn!("[logs] failed to clear {category}: {e}");
                self.toast(Toast::error(format!("Failed to clear logs: {e}")));
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Archives
    // -------------------------------------------------------------------------

    /// Load the archive list the first time archives are shown.
    ///
    /// Later calls do nothing once a load has succeeded.
    pub async fn show_archives(&self) {
        let fire = self
            .with_state(|s| !std::mem::replace(&mut s.archives_latched, true))
            .unwrap_or(false);
        if fire {
            self.load_archives().await;
        }
    }

    /// Reload the archive list unconditionally.
    pub async fn refresh_archives(&self) {
        self.with_state(|s| s.archives_latched = true);
        self.load_archives().await;
    }

    async fn load_archives(&self) {
        let generation = self.shared.archive_generation.load(Ordering::SeqCst);
        self.with_state(|s| s.archives_loading = true);
        let result = self.shared.source.fetch_archives().await;
        if self.shared.archive_generation.load(Ordering::SeqCst) != generation {
            return;
        }
        self.with_state(|s| {
            s.archives_loading = false;
            match result {
                Ok(files) => s.archives = files,
                Err(e) => {
                    log::warn!("[logs] failed to fetch archives: {e}");
                    // Let the next show retry.
                    s.archives_latched = false;
                    s.toasts.push(Toast::error(format!("Failed to load archives: {e}")));
                }
            }
        });
    }

    pub fn archives(&self) -> Vec<LogFile> {
        self.with_state(|s| s.archives.clone()).unwrap_or_default()
    }

    pub fn is_archives_loading(&self) -> bool {
        self.with_state(|s| s.archives_loading).unwrap_or(false)
    }

    /// Delete an archive, removing it from the list on success.
    pub async fn delete_archive(&self, name: &str) -> bool {
        match self.shared.source.delete_archive(name).await {
            Ok(()) => {
                self.with_state(|s| {
                    s.archives.retain(|f| f.name != name);
                    s.toasts.push(Toast::success(format!("Deleted {name}")));
                });
                true
            }
            Err(e) => {
                log::warn!("[logs] failed to delete archive {name}: {e}");
                self.toast(Toast::error(format!("Failed to delete {name}: {e}")));
                false
            }
        }
    }

    /// Contents of an archive.
    pub async fn download_archive(&self, name: &str) -> Option<Vec<u8>> {
        match self.shared.source.download_archive(name).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("[logs] failed to download archive {name}: {e}");
                self.toast(Toast::error(format!("Failed to download {name}: {e}")));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::SourceError;

    struct StaticSource(Vec<&'static str>);

    #[async_trait]
    impl LogSource for StaticSource {
        async fn fetch_logs(&self, category: &str) -> Result<Vec<RawLogEntry>, SourceError> {
            Ok(self
                .0
                .iter()
                .map(|m| RawLogEntry::message(format!("{category}: {m}")))
                .collect())
        }

        async fn fetch_archives(&self) -> Result<Vec<LogFile>, SourceError> {
            Ok(Vec::new())
        }

        async fn clear_logs(&self, _category: &str) -> Result<(), SourceError> {
            Err(SourceError::request("read-only"))
        }

        async fn download_archive(&self, name: &str) -> Result<Vec<u8>, SourceError> {
            Err(SourceError::NotFound(name.to_string()))
        }

        async fn delete_archive(&self, name: &str) -> Result<(), SourceError> {
            Err(SourceError::NotFound(name.to_string()))
        }
    }

    fn viewer(config: LogViewerConfig) -> LogViewer {
        LogViewer::new(Arc::new(StaticSource(vec!["one", "two", "three"])), config)
    }

    #[tokio::test]
    async fn test_refresh_replaces_and_follows() {
        let v = viewer(LogViewerConfig::default().with_category("api"));
        v.refresh().await;
        assert_eq!(v.len(), 3);
        assert_eq!(v.entries()[0].message, "api: one");
        assert_eq!(v.take_scroll_request(), Some(ScrollRequest::IntoView(2)));
        assert!(!v.is_loading());
    }

    #[tokio::test]
    async fn test_newest_first_follow_targets_top() {
        let v = viewer(LogViewerConfig::default().with_newest_first(true));
        v.refresh().await;
        assert_eq!(v.entries()[0].message, "default: three");
        assert_eq!(v.take_scroll_request(), Some(ScrollRequest::IntoView(0)));
    }

    #[tokio::test]
    async fn test_follow_off_queues_nothing() {
        let v = viewer(LogViewerConfig::default().with_follow(false));
        v.refresh().await;
        assert_eq!(v.take_scroll_request(), None);
        v.toggle_follow();
        assert_eq!(v.take_scroll_request(), Some(ScrollRequest::IntoView(2)));
    }

    #[test]
    fn test_filters() {
        let v = viewer(LogViewerConfig::default());
        v.push(vec![
            RawLogEntry::message("fine").with_level("info"),
            RawLogEntry::message("bad").with_level("warn"),
            RawLogEntry::message("Error: worse"),
        ]);
        v.set_levels([LogLevel::Error, LogLevel::Warn]);
        assert_eq!(v.visible_entries().len(), 2);
        v.set_search("WORSE");
        assert_eq!(v.visible_entries().len(), 1);
        v.toggle_level(LogLevel::Error);
        assert!(v.visible_entries().is_empty());
    }

    #[test]
    fn test_pause_holds_entries() {
        let v = viewer(LogViewerConfig::default());
        v.pause();
        v.push(vec![RawLogEntry::message("held")]);
        assert!(v.is_empty());
        v.resume();
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_export_formats() {
        let v = viewer(LogViewerConfig::default());
        v.push(vec![RawLogEntry::message("2024-03-01 12:30:45.123 INFO [api] ready")]);
        let text = v.export(ExportFormat::Text).unwrap();
        assert_eq!(text, "2024-03-01 12:30:45.123 INFO    [api] ready");
        let json = v.export(ExportFormat::JsonLines).unwrap();
        let parsed: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.message, "ready");
    }

    #[tokio::test]
    async fn test_failures_toast() {
        let v = viewer(LogViewerConfig::default());
        assert!(!v.clear_logs().await);
        assert!(v.download_archive("x.log").await.is_none());
        let toasts = v.take_toasts();
        assert_eq!(toasts.len(), 2);
        assert!(toasts.iter().all(|t| t.level == crate::toast::ToastLevel::Error));
        assert!(v.take_toasts().is_empty());
    }
}
