//! Log entry types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key holding coalesced stack frames.
pub const STACK_KEY: &str = "stack";

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
    Other,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Verbose,
        LogLevel::Other,
    ];

    /// Parse a level name, case-insensitively. Unknown names map to `Other`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" | "err" | "fatal" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "verbose" | "trace" => LogLevel::Verbose,
            _ => LogLevel::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Other => "other",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry as delivered by a [`LogSource`](super::LogSource), before
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub level: Option<String>,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RawLogEntry {
    /// A bare message; everything else is filled in by the pipeline.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A normalized log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl LogEntry {
    /// Coalesced stack frames, newline joined.
    pub fn stack(&self) -> Option<&str> {
        self.metadata.get(STACK_KEY).map(String::as_str)
    }

    pub(crate) fn push_frame(&mut self, frame: &str) {
        self.metadata
            .entry(STACK_KEY.to_string())
            .and_modify(|stack| {
                stack.push('\n');
                stack.push_str(frame);
            })
            .or_insert_with(|| frame.to_string());
    }

    /// Single-line rendering used by plain-text export. Stack frames follow
    /// on their own lines.
    pub fn to_text(&self) -> String {
        let mut line = format!(
            "{} {:<7}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level.as_str().to_ascii_uppercase()
        );
        if let Some(source) = &self.source {
            line.push_str(&format!(" [{source}]"));
        }
        line.push(' ');
        line.push_str(&self.message);
        if let Some(stack) = self.stack() {
            line.push('\n');
            line.push_str(stack);
        }
        line
    }

    /// Whether the message, source or stack contains `query` (lowercase).
    pub(crate) fn contains(&self, query: &str) -> bool {
        self.message.to_lowercase().contains(query)
            || self
                .source
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(query))
            || self
                .stack()
                .is_some_and(|s| s.to_lowercase().contains(query))
    }
}

/// Archived log file descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFile {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub modified: DateTime<Utc>,
}
