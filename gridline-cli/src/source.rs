//! Log source backed by a directory of plain-text log files.
//!
//! Layout: `<root>/<category>.log` for current logs, `<root>/archive/*.log`
//! for archives.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridline::logs::{LogHandler, Subscription};
use gridline::{LogFile, LogSource, RawLogEntry, SourceError};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const ARCHIVE_DIR: &str = "archive";
const TAIL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct FileLogSource {
    root: PathBuf,
}

impl FileLogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn category_path(&self, category: &str) -> Result<PathBuf, SourceError> {
        Ok(self.root.join(format!("{}.log", checked_name(category)?)))
    }

    fn archive_path(&self, name: &str) -> Result<PathBuf, SourceError> {
        Ok(self.root.join(ARCHIVE_DIR).join(checked_name(name)?))
    }
}

/// Reject names that would escape the root.
fn checked_name(name: &str) -> Result<&str, SourceError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(SourceError::NotFound(name.to_string()));
    }
    Ok(name)
}

fn lines_to_entries(text: &str, category: &str) -> Vec<RawLogEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| RawLogEntry {
            category: Some(category.to_string()),
            ..RawLogEntry::message(line)
        })
        .collect()
}

#[async_trait]
impl LogSource for FileLogSource {
    async fn fetch_logs(&self, category: &str) -> Result<Vec<RawLogEntry>, SourceError> {
        let path = self.category_path(category)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(lines_to_entries(&text, category)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_archives(&self) -> Result<Vec<LogFile>, SourceError> {
        let dir = self.root.join(ARCHIVE_DIR);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());
            files.push(LogFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified,
            });
        }
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }

    async fn clear_logs(&self, category: &str) -> Result<(), SourceError> {
        let path = self.category_path(category)?;
        if tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, b"").await?;
        }
        Ok(())
    }

    async fn download_archive(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        Ok(tokio::fs::read(self.archive_path(name)?).await?)
    }

    async fn delete_archive(&self, name: &str) -> Result<(), SourceError> {
        Ok(tokio::fs::remove_file(self.archive_path(name)?).await?)
    }

    /// Tail the category file, pushing appended lines.
    fn subscribe(&self, category: &str, handler: LogHandler) -> Subscription {
        let (subscription, token) = Subscription::new();
        let Ok(path) = self.category_path(category) else {
            return subscription;
        };
        let category = category.to_string();

        tokio::spawn(async move {
            let mut offset = file_len(&path).await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(TAIL_INTERVAL) => {}
                }
                match read_from(&path, offset).await {
                    Ok((text, next)) => {
                        offset = next;
                        let entries = lines_to_entries(&text, &category);
                        if !entries.is_empty() {
                            handler(entries);
                        }
                    }
                    Err(e) => log::debug!("[tail] {}: {e}", path.display()),
                }
            }
            log::debug!("[tail] stopped {}", path.display());
        });

        subscription
    }
}

async fn file_len(path: &Path) -> u64 {
    tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
}

/// Read complete lines appended after `offset`. A truncated file restarts
/// from the beginning.
async fn read_from(path: &Path, offset: u64) -> std::io::Result<(String, u64)> {
    let len = file_len(path).await;
    let start = if len < offset { 0 } else { offset };
    if len == start {
        return Ok((String::new(), start));
    }

    let mut file = tokio::fs::File::open(path).await?;
    file.seek(std::io::SeekFrom::Start(start)).await?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await?;

    // Leave a partial trailing line for the next read.
    let complete = buf.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let text = String::from_utf8_lossy(&buf[..complete]).into_owned();
    Ok((text, start + complete as u64))
}
