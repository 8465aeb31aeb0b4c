//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "gridline";
const APPLICATION: &str = "gridline";

/// Maximum number of rotated log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Persistent application data.
///
/// - Linux: `$XDG_DATA_HOME/gridline` or `~/.local/share/gridline`
/// - macOS: `~/Library/Application Support/dev.gridline.gridline`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Regenerable data; holds our own logs.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// The table layout database.
pub fn layout_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("layout.db"))
}

/// The log file of the running process.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}

/// Rename `latest.log` to a timestamped name and prune old logs.
///
/// Call at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    if fs::create_dir_all(&cache).is_err() {
        return;
    }
    rotate_in(&cache, MAX_OLD_LOGS);
}

fn rotate_in(dir: &Path, keep: usize) {
    let latest = dir.join("latest.log");
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.3f");
        let _ = fs::rename(&latest, dir.join(format!("{timestamp}.log")));
    }
    cleanup_old_logs(dir, keep);
}

/// Keep the `keep` most recent rotated logs.
fn cleanup_old_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != "latest.log"
        })
        .collect();

    // Oldest first; names are timestamps so they break mtime ties.
    logs.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));

    if logs.len() > keep {
        for entry in logs.iter().take(logs.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }
    }
}
