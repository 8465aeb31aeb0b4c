//! Ingestion pipeline: normalize, coalesce, sort, cap.
//!
//! Every arrival path (fetch, poll, live push) goes through [`LogBuffer`],
//! so a pass always sees the entries left by the previous one.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, Utc};
use regex::Regex;

use super::entry::{LogEntry, LogLevel, RawLogEntry};

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").expect("valid regex")
});

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3})\s+(\w+)\s+\[([^\]]+)\]\s+(.*)$")
        .expect("valid regex")
});

static ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error:|uncaught exception").expect("valid regex"));

static FRAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*at\s").expect("valid regex"));

const PREFIX_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Remove terminal escape sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(text, "")
}

/// Whether a message is a stack frame line.
pub fn is_stack_frame(message: &str) -> bool {
    FRAME_RE.is_match(message)
}

/// Normalize a raw entry.
///
/// A `YYYY-MM-DD HH:mm:ss.SSS LEVEL [source] rest` prefix is lifted into the
/// entry fields, and messages that look like errors are forced to `Error`.
pub fn normalize(raw: RawLogEntry, default_category: &str) -> LogEntry {
    let mut message = strip_ansi(&raw.message).into_owned();
    let mut timestamp = raw.timestamp;
    let mut level = raw.level.as_deref().map(LogLevel::parse);
    let mut source = raw.source;

    let prefix = PREFIX_RE.captures(&message).map(|caps| {
        (
            NaiveDateTime::parse_from_str(&caps[1], PREFIX_TIMESTAMP_FORMAT).ok(),
            LogLevel::parse(&caps[2]),
            caps[3].to_string(),
            caps[4].to_string(),
        )
    });
    if let Some((prefix_time, prefix_level, prefix_source, rest)) = prefix {
        // Prefix timestamps carry no zone; they are taken as UTC.
        if let Some(naive) = prefix_time {
            timestamp = Some(naive.and_utc());
        }
        level = Some(prefix_level);
        source = Some(prefix_source);
        message = rest;
    }

    if ERROR_RE.is_match(&message) {
        level = Some(LogLevel::Error);
    }

    LogEntry {
        id: raw.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        timestamp: timestamp.unwrap_or_else(Utc::now),
        level: level.unwrap_or(LogLevel::Info),
        message,
        category: raw
            .category
            .unwrap_or_else(|| default_category.to_string()),
        source,
        metadata: raw.metadata,
    }
}

/// The entry list of one stream, ascending by timestamp.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: Vec<LogEntry>,
    max_entries: Option<usize>,
    /// Id of the last entry appended, the target for stack frames.
    last_appended: Option<String>,
}

impl LogBuffer {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.filter(|&n| n > 0),
            last_appended: None,
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_appended = None;
    }

    /// Replace the contents with a fetch response.
    pub fn replace(&mut self, raws: Vec<RawLogEntry>, category: &str) {
        self.clear();
        self.extend(raws, category);
    }

    /// Append entries from any arrival path.
    pub fn extend(&mut self, raws: Vec<RawLogEntry>, category: &str) {
        for raw in raws {
            let entry = normalize(raw, category);

            if is_stack_frame(&entry.message)
                && let Some(target) = self.last_appended_mut()
            {
                target.push_frame(&entry.message);
                continue;
            }

            self.last_appended = Some(entry.id.clone());
            self.entries.push(entry);
        }

        // Stable, so same-timestamp entries keep arrival order.
        self.entries.sort_by_key(|e| e.timestamp);
        self.cap();
    }

    fn last_appended_mut(&mut self) -> Option<&mut LogEntry> {
        let id = self.last_appended.as_deref()?;
        self.entries.iter_mut().rev().find(|e| e.id == id)
    }

    fn cap(&mut self) {
        let Some(max) = self.max_entries else {
            return;
        };
        if self.entries.len() > max {
            let excess = self.entries.len() - max;
            log::debug!("[logs] evicting {excess} oldest entries");
            self.entries.drain(..excess);
            let evicted = self
                .last_appended
                .as_ref()
                .is_some_and(|id| !self.entries.iter().any(|e| &e.id == id));
            if evicted {
                self.last_appended = None;
            }
        }
    }

    /// Remove entries that no longer match `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&LogEntry) -> bool) {
        self.entries.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m plain"), "red plain");
        assert_eq!(strip_ansi("no escapes"), "no escapes");
    }

    #[test]
    fn test_normalize_prefix() {
        let entry = normalize(
            RawLogEntry::message("2024-03-01 12:30:45.123 WARN [worker] disk almost full"),
            "app",
        );
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.source.as_deref(), Some("worker"));
        assert_eq!(entry.message, "disk almost full");
        assert_eq!(entry.category, "app");
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_normalize_error_override() {
        let entry = normalize(
            RawLogEntry::message("Uncaught Exception in handler").with_level("info"),
            "app",
        );
        assert_eq!(entry.level, LogLevel::Error);

        let entry = normalize(
            RawLogEntry::message("2024-03-01 12:30:45.123 DEBUG [db] TypeError: x is undefined"),
            "app",
        );
        assert_eq!(entry.level, LogLevel::Error);
    }

    #[test]
    fn test_coalesce_stack_frames() {
        let mut buffer = LogBuffer::new(None);
        buffer.extend(
            vec![
                RawLogEntry::message("Error X"),
                RawLogEntry::message("    at foo (a.js:1)"),
                RawLogEntry::message("    at bar (b.js:2)"),
            ],
            "app",
        );
        assert_eq!(buffer.len(), 1);
        let entry = &buffer.entries()[0];
        assert_eq!(entry.message, "Error X");
        assert_eq!(entry.stack(), Some("    at foo (a.js:1)\n    at bar (b.js:2)"));
    }

    #[test]
    fn test_orphan_frame_is_own_entry() {
        let mut buffer = LogBuffer::new(None);
        buffer.extend(vec![RawLogEntry::message("  at nowhere")], "app");
        assert_eq!(buffer.len(), 1);
        assert!(buffer.entries()[0].stack().is_none());
    }

    #[test]
    fn test_sorted_and_capped() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut buffer = LogBuffer::new(Some(3));
        let raws = [4, 1, 3, 0, 2]
            .into_iter()
            .map(|s| {
                RawLogEntry::message(format!("m{s}"))
                    .with_timestamp(base + chrono::Duration::seconds(s))
            })
            .collect();
        buffer.extend(raws, "app");
        let messages: Vec<&str> = buffer.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["m2", "m3", "m4"]);
    }
}
