//! # Favorites
//!
//! JSON-file-backed store for the user's saved fishing spots.
//!
//! - Loads from a JSON file, falling back to an empty list on any read or
//!   parse error (the file may simply not exist yet).
//! - Uniqueness is by exact match on the trimmed name.
//! - `id` is the creation timestamp in milliseconds; `added_at` is ISO-8601.
//!
//! The scoring core never touches this store; it only backs the locations API.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One saved fishing spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub id: i64,
    pub name: String,
    pub added_at: String,
}

#[derive(Debug)]
pub struct FavoritesStore {
    inner: Mutex<Vec<SavedLocation>>,
    /// Serializes writers and their disk writes; `inner` is only held for the
    /// in-memory mutation, never across file I/O, so readers don't wait on disk.
    write_lock: Mutex<()>,
    path: PathBuf,
}

/// Why an add was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    EmptyName,
    AlreadySaved,
}

impl FavoritesStore {
    /// Open a store backed by `path`. Missing or malformed files start empty.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let locations = match std::fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        Self {
            inner: Mutex::new(locations),
            write_lock: Mutex::new(()),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Add a spot by name. Trims whitespace, rejects empties and duplicates,
    /// persists on success.
    pub fn add(&self, name: &str) -> Result<SavedLocation, AddError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AddError::EmptyName);
        }

        let now = Utc::now();
        let loc = SavedLocation {
            id: now.timestamp_millis(),
            name: name.to_string(),
            added_at: now.to_rfc3339(),
        };

        let _w = self.write_lock.lock().expect("favorites write lock poisoned");
        let snapshot = {
            let mut v = self.inner.lock().expect("favorites mutex poisoned");
            if v.iter().any(|l| l.name == name) {
                return Err(AddError::AlreadySaved);
            }
            v.push(loc.clone());
            v.clone()
        };
        self.persist(&snapshot);
        Ok(loc)
    }

    /// Remove by id; returns whether anything was removed.
    pub fn remove(&self, id: i64) -> bool {
        let _w = self.write_lock.lock().expect("favorites write lock poisoned");
        let snapshot = {
            let mut v = self.inner.lock().expect("favorites mutex poisoned");
            let before = v.len();
            v.retain(|l| l.id != id);
            if v.len() == before {
                return false;
            }
            v.clone()
        };
        self.persist(&snapshot);
        true
    }

    pub fn snapshot(&self) -> Vec<SavedLocation> {
        self.inner
            .lock()
            .expect("favorites mutex poisoned")
            .clone()
    }

    fn persist(&self, locations: &[SavedLocation]) {
        if let Err(e) = self.try_persist(locations) {
            tracing::warn!(error = ?e, "failed to persist favorites");
        }
    }

    fn try_persist(&self, locations: &[SavedLocation]) -> Result<()> {
        let json = serde_json::to_string_pretty(locations)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing favorites to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> FavoritesStore {
        let path = std::env::temp_dir().join(format!(
            "fishing-favorites-{tag}-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        FavoritesStore::load_from_file(path)
    }

    #[test]
    fn add_trims_and_dedupes_by_name() {
        let store = temp_store("dedupe");
        let loc = store.add("  武汉东湖  ").unwrap();
        assert_eq!(loc.name, "武汉东湖");
        assert_eq!(store.add("武汉东湖"), Err(AddError::AlreadySaved));
        assert_eq!(store.add("   "), Err(AddError::EmptyName));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn remove_by_id() {
        let store = temp_store("remove");
        let a = store.add("甲地").unwrap();
        store.add("乙地").unwrap();
        assert!(store.remove(a.id));
        assert!(!store.remove(a.id));
        let left = store.snapshot();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "乙地");
    }

    #[test]
    fn reload_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "fishing-favorites-reload-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        {
            let store = FavoritesStore::load_from_file(&path);
            store.add("鄱阳湖").unwrap();
        }
        let reloaded = FavoritesStore::load_from_file(&path);
        let snap = reloaded.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].name, "鄱阳湖");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn snapshot_never_waits_on_a_writers_disk_io() {
        // Writers mutate under `inner` briefly and persist outside it, so
        // concurrent adds all land in memory and the last write on disk
        // contains every entry.
        let path = std::env::temp_dir().join(format!(
            "fishing-favorites-threads-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let store = std::sync::Arc::new(FavoritesStore::load_from_file(&path));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let s = store.clone();
                std::thread::spawn(move || {
                    s.add(&format!("钓点-{i}")).unwrap();
                    s.snapshot()
                })
            })
            .collect();
        for h in handles {
            assert!(!h.join().unwrap().is_empty());
        }

        assert_eq!(store.snapshot().len(), 4);
        let reloaded = FavoritesStore::load_from_file(&path);
        assert_eq!(reloaded.snapshot().len(), 4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "fishing-favorites-bad-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();
        let store = FavoritesStore::load_from_file(&path);
        assert!(store.snapshot().is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
