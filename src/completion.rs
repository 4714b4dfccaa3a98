use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::common::types::date_key;

/// Set of action date keys the user marked complete, persisted as a JSON
/// array of `YYYY-MM-DD` strings.
///
/// Read once when opened and rewritten wholesale on every change. An
/// unreadable or corrupt file counts as "nothing completed"; failed writes
/// are logged and otherwise ignored.
pub struct CompletionStore {
    path: PathBuf,
    keys: Mutex<BTreeSet<String>>,
}

impl CompletionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let keys = load_keys(&path);
        debug!(path = %path.display(), completed = keys.len(), "completion store opened");
        Self {
            path,
            keys: Mutex::new(keys),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_keys(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.keys.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_complete(&self, date: NaiveDate) -> bool {
        self.lock_keys().contains(&date_key(date))
    }

    /// Flip the completion state of `date`; returns whether it is now complete.
    pub fn toggle_complete(&self, date: NaiveDate) -> bool {
        let key = date_key(date);
        let mut keys = self.lock_keys();
        let now_complete = if keys.remove(&key) {
            false
        } else {
            keys.insert(key);
            true
        };
        self.save(&keys);
        now_complete
    }

    /// Completed keys in ascending date order.
    pub fn completed_keys(&self) -> Vec<String> {
        self.lock_keys().iter().cloned().collect()
    }

    fn save(&self, keys: &BTreeSet<String>) {
        let result = serde_json::to_string(keys)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| e.to_string())?;
                }
                fs::write(&self.path, json).map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            warn!(path = %self.path.display(), "failed to persist completions: {}", e);
        }
    }
}

fn load_keys(path: &Path) -> BTreeSet<String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeSet::new(),
        Err(e) => {
            warn!(path = %path.display(), "completion store unreadable, starting empty: {}", e);
            return BTreeSet::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(keys) => keys.into_iter().collect(),
        Err(e) => {
            warn!(path = %path.display(), "completion store corrupt, starting empty: {}", e);
            BTreeSet::new()
        }
    }
}
