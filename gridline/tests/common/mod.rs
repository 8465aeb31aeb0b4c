//! Shared test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gridline::logs::{LogHandler, Subscription};
use gridline::{LogFile, LogSource, RawLogEntry, SourceError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

const ARCHIVES_GATE: &str = "archives";

/// A log source whose responses are set up by the test.
#[derive(Default)]
pub struct ScriptedSource {
    logs: Mutex<HashMap<String, Vec<RawLogEntry>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    archives: Mutex<Vec<LogFile>>,
    subscribers: Mutex<Vec<(String, LogHandler, CancellationToken)>>,
    pub fetches: AtomicUsize,
    pub archive_fetches: AtomicUsize,
    pub fail_archives: AtomicBool,
    pub fail_fetch: AtomicBool,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_logs(&self, category: &str, entries: Vec<RawLogEntry>) {
        self.logs
            .lock()
            .unwrap()
            .insert(category.to_string(), entries);
    }

    /// Hold fetches of a category until the returned gate is notified.
    pub fn gate(&self, category: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(category.to_string(), gate.clone());
        gate
    }

    /// Hold archive listings until the returned gate is notified.
    pub fn gate_archives(&self) -> Arc<Notify> {
        self.gate(ARCHIVES_GATE)
    }

    /// Hold clears of a category until the returned gate is notified.
    pub fn gate_clear(&self, category: &str) -> Arc<Notify> {
        self.gate(&format!("clear:{category}"))
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn set_archives(&self, names: &[&str]) {
        *self.archives.lock().unwrap() = names
            .iter()
            .map(|name| LogFile {
                name: name.to_string(),
                size: 1024,
                modified: at(0),
            })
            .collect();
    }

    /// Push entries to live subscribers of a category.
    pub fn emit(&self, category: &str, entries: Vec<RawLogEntry>) {
        let handlers: Vec<LogHandler> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _, token)| c == category && !token.is_cancelled())
            .map(|(_, handler, _)| handler.clone())
            .collect();
        for handler in handlers {
            handler(entries.clone());
        }
    }

    /// Subscriptions still open.
    pub fn active_subscriptions(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, token)| !token.is_cancelled())
            .count()
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn fetch_logs(&self, category: &str) -> Result<Vec<RawLogEntry>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.wait_gate(category).await;
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("offline".into()));
        }
        Ok(self
            .logs
            .lock()
            .unwrap()
            .get(category)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_archives(&self) -> Result<Vec<LogFile>, SourceError> {
        self.archive_fetches.fetch_add(1, Ordering::SeqCst);
        self.wait_gate(ARCHIVES_GATE).await;
        if self.fail_archives.load(Ordering::SeqCst) {
            return Err(SourceError::request("500"));
        }
        Ok(self.archives.lock().unwrap().clone())
    }

    async fn clear_logs(&self, category: &str) -> Result<(), SourceError> {
        self.wait_gate(&format!("clear:{category}")).await;
        self.logs.lock().unwrap().remove(category);
        Ok(())
    }

    async fn download_archive(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        if self.archives.lock().unwrap().iter().any(|f| f.name == name) {
            Ok(format!("contents of {name}").into_bytes())
        } else {
            Err(SourceError::NotFound(name.to_string()))
        }
    }

    async fn delete_archive(&self, name: &str) -> Result<(), SourceError> {
        let mut archives = self.archives.lock().unwrap();
        let before = archives.len();
        archives.retain(|f| f.name != name);
        if archives.len() == before {
            return Err(SourceError::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn subscribe(&self, category: &str, handler: LogHandler) -> Subscription {
        let (subscription, token) = Subscription::new();
        self.subscribers
            .lock()
            .unwrap()
            .push((category.to_string(), handler, token));
        subscription
    }
}

/// A fixed instant offset by `seconds`.
pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
}

pub fn entry(message: &str, seconds: i64) -> RawLogEntry {
    RawLogEntry::message(message).with_timestamp(at(seconds))
}
