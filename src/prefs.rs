//! Key-value preference store.
//!
//! The browser-local preference store of the original UI (selected theme,
//! selected feed mode, collapsed panels) as a JSON-file-backed string map.
//! Writes persist immediately; a missing or corrupt file loads as an empty
//! store and is never an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, UiError};

/// Write-through string key-value store.
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Open the store backed by `path`.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "preference file unreadable; starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    /// Look up a preference.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a preference and persist the store.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.into(), value.into());
        self.persist()
    }

    /// Remove a preference and persist the store. Removing an absent key
    /// still persists (and succeeds).
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        self.persist()
    }

    /// Number of stored preferences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| UiError::Prefs(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Preference key for the selected theme.
pub const PREF_THEME: &str = "theme";
/// Preference key for the selected feed mode.
pub const PREF_FEED_MODE: &str = "feed_mode";

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::load(dir.path().join("prefs.json"));
        assert!(store.is_empty());
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "][").unwrap();
        let store = PreferenceStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn set_get_round_trips_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferenceStore::load(&path);
        store.set(PREF_THEME, "dark").unwrap();
        store.set(PREF_FEED_MODE, "push").unwrap();
        assert_eq!(store.get(PREF_THEME), Some("dark"));

        let reloaded = PreferenceStore::load(&path);
        assert_eq!(reloaded.get(PREF_THEME), Some("dark"));
        assert_eq!(reloaded.get(PREF_FEED_MODE), Some("push"));
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn remove_persists_and_tolerates_absent_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferenceStore::load(&path);
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("never-existed").unwrap();

        let reloaded = PreferenceStore::load(&path);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn set_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("prefs.json");
        let mut store = PreferenceStore::load(&path);
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }
}
