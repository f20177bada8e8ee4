use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::lock::LockPolicy;
use super::{AngleSelector, AngleSuggestion, Category, HistoryEntry};
use crate::config::HistoryConfig;
use crate::error::HistoryError;

/// Entries kept in the log; older ones are evicted first.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

const APP_DIR: &str = "review-forge";
const HISTORY_FILE: &str = "content_history.json";

/// The persisted document: `{ "entries": [...] }`, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    fn push_bounded(&mut self, entry: HistoryEntry, max_entries: usize) {
        self.entries.push(entry);
        if self.entries.len() > max_entries {
            let excess = self.entries.len() - max_entries;
            self.entries.drain(..excess);
        }
    }

    fn from_json(raw: &str) -> Result<Self, HistoryError> {
        if raw.trim().is_empty() {
            return Ok(HistoryLog::default());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

/// JSON-file history shared by every automation process on the machine.
///
/// Every read and every read-modify-write holds an advisory exclusive lock on
/// the file. Lock acquisition is retried a bounded number of times; when it
/// keeps failing, appends are skipped and reads fall back to an unlocked read.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
    write_lock: LockPolicy,
    read_lock: LockPolicy,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore {
            path: path.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
            write_lock: LockPolicy {
                attempts: 5,
                delay: Duration::from_millis(500),
            },
            read_lock: LockPolicy {
                attempts: 5,
                delay: Duration::from_millis(300),
            },
        }
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        let path = config.path.clone().unwrap_or_else(Self::default_path);
        HistoryStore {
            path,
            max_entries: config.max_entries.max(1),
            write_lock: LockPolicy {
                attempts: config.lock_attempts,
                delay: Duration::from_millis(config.write_retry_delay_ms),
            },
            read_lock: LockPolicy {
                attempts: config.lock_attempts,
                delay: Duration::from_millis(config.read_retry_delay_ms),
            },
        }
    }

    /// `<data dir>/review-forge/content_history.json`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join(HISTORY_FILE)
    }

    /// Overrides the lock retry budget for both reads and writes.
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.write_lock = LockPolicy { attempts, delay };
        self.read_lock = LockPolicy { attempts, delay };
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an entry, logging instead of failing.
    pub fn append(&self, entry: HistoryEntry) {
        let category = entry.category;
        let angle = entry.approach_angle.clone();
        match self.try_append(entry) {
            Ok(()) => info!("Saved history entry: {} - {}", category, angle),
            Err(e) => warn!("Skipping history write: {}", e),
        }
    }

    /// Appends an entry under the file lock and trims the log to the newest
    /// `max_entries`.
    pub fn try_append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        let max_entries = self.max_entries;
        let mut pending = Some(entry);
        self.write_lock.run(&mut file, |file| {
            let mut log = read_log(file)?;
            if let Some(entry) = pending.take() {
                log.push_bounded(entry, max_entries);
            }
            write_log(file, &log)
        })
    }

    /// Loads the whole log, never failing.
    ///
    /// A missing file is an empty log. When the lock cannot be acquired the
    /// file is read without it; any other failure yields an empty log.
    pub fn load(&self) -> HistoryLog {
        match self.try_load() {
            Ok(log) => log,
            Err(HistoryError::LockContended { attempts }) => {
                warn!(
                    "History still locked after {} attempts, reading without lock",
                    attempts
                );
                fs::read_to_string(&self.path)
                    .map_err(HistoryError::from)
                    .and_then(|raw| HistoryLog::from_json(&raw))
                    .unwrap_or_else(|e| {
                        warn!("Unlocked history read failed: {}", e);
                        HistoryLog::default()
                    })
            }
            Err(e) => {
                warn!("Failed to load history: {}", e);
                HistoryLog::default()
            }
        }
    }

    /// Loads the whole log under the file lock.
    pub fn try_load(&self) -> Result<HistoryLog, HistoryError> {
        if !self.path.exists() {
            return Ok(HistoryLog::default());
        }

        let mut file = File::open(&self.path)?;
        self.read_lock.run(&mut file, read_log)
    }

    /// Up to `limit` most recent entries of `category`, oldest first.
    pub fn recent_by_category(&self, category: Category, limit: usize) -> Vec<HistoryEntry> {
        let mut matching: Vec<HistoryEntry> = self
            .load()
            .entries
            .into_iter()
            .filter(|entry| entry.category == category)
            .collect();

        let skip = matching.len().saturating_sub(limit);
        matching.drain(..skip);
        matching
    }

    /// Classifies `product_title` and suggests angles from the last `limit`
    /// posts in that category.
    pub fn suggest(&self, product_title: &str, limit: usize) -> AngleSuggestion {
        let category = Category::classify(product_title);
        let recent = self.recent_by_category(category, limit);
        debug!(
            "Found {} recent '{}' entries for differentiation",
            recent.len(),
            category
        );
        AngleSelector.suggest(category, &recent)
    }
}

fn read_log(file: &mut File) -> Result<HistoryLog, HistoryError> {
    let mut raw = String::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_string(&mut raw)?;
    HistoryLog::from_json(&raw)
}

fn write_log(file: &mut File, log: &HistoryLog) -> Result<(), HistoryError> {
    let json = serde_json::to_string_pretty(log)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(n: usize, category: Category) -> HistoryEntry {
        HistoryEntry {
            timestamp: format!("2025-01-01 00:00:{:02}", n % 60),
            product_title: format!("product {}", n),
            category,
            approach_angle: "소재/촉감".to_string(),
            key_points: vec![],
        }
    }

    #[test]
    fn test_push_bounded_keeps_suffix() {
        let mut log = HistoryLog::default();
        for n in 0..5 {
            log.push_bounded(entry(n, Category::Food), 3);
        }
        let titles: Vec<_> = log.entries.iter().map(|e| e.product_title.as_str()).collect();
        assert_eq!(titles, vec!["product 2", "product 3", "product 4"]);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("nope.json"));
        assert!(store.try_load().unwrap().entries.is_empty());
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("a/b/history.json"));
        store.try_append(entry(1, Category::Food)).unwrap();
        assert_eq!(store.load().entries.len(), 1);
    }

    #[test]
    fn test_corrupt_file_fails_append_but_load_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();
        let store = HistoryStore::new(&path);

        assert!(matches!(
            store.try_append(entry(1, Category::Food)),
            Err(HistoryError::Json(_))
        ));
        assert!(store.load().entries.is_empty());
        // the unreadable file is left as it was
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_persisted_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new(&path);
        store.try_append(entry(7, Category::Bedding)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let first = &raw["entries"][0];
        assert_eq!(first["product_title"], "product 7");
        assert_eq!(first["category"], "이불");
        assert_eq!(first["approach_angle"], "소재/촉감");
        assert!(first["key_points"].is_array());
        assert!(first["timestamp"].is_string());
    }
}
