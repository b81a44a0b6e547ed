//! Walk store - persistence boundary for completed walks
//!
//! Walks live in a single JSON document (`{"walks": [...]}`), pretty-printed
//! and rewritten whole on every mutation. Small enough for single-device
//! walk history; the document shape is shared with the mobile app.

use crate::domain::walk::Walk;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence interface for completed walks.
///
/// The session engine depends only on `save`; listing, lookup and deletion
/// are consumed by presentation code.
pub trait WalkStore: Send + Sync {
    fn save(&self, walk: &Walk) -> Result<(), StoreError>;
    /// All walks, newest `startTime` first
    fn list_all(&self) -> Result<Vec<Walk>, StoreError>;
    fn get_by_id(&self, id: &str) -> Result<Option<Walk>, StoreError>;
    /// Returns true when a walk was removed
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// On-disk document shape
#[derive(Debug, Default, Serialize, Deserialize)]
struct WalkDocument {
    #[serde(default)]
    walks: Vec<Walk>,
}

/// File-backed walk store.
///
/// Saving upserts by walk id. A missing or unreadable file reads as an
/// empty history; unknown fields in stored records are tolerated.
pub struct JsonWalkStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles against the document
    lock: Mutex<()>,
}

impl JsonWalkStore {
    pub fn new(path: &str) -> Self {
        info!(path = %path, "walk_store_initialized");
        Self { path: PathBuf::from(path), lock: Mutex::new(()) }
    }

    fn read_document(&self) -> WalkDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return WalkDocument::default(),
        };
        match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "walk_store_unreadable");
                WalkDocument::default()
            }
        }
    }

    fn write_document(&self, doc: &WalkDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), walks = %doc.walks.len(), "walk_store_written");
        Ok(())
    }
}

impl WalkStore for JsonWalkStore {
    fn save(&self, walk: &Walk) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.read_document();

        match doc.walks.iter_mut().find(|w| w.id == walk.id) {
            Some(existing) => *existing = walk.clone(),
            None => doc.walks.push(walk.clone()),
        }

        self.write_document(&doc)
    }

    fn list_all(&self) -> Result<Vec<Walk>, StoreError> {
        let _guard = self.lock.lock();
        let mut walks = self.read_document().walks;
        walks.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(walks)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Walk>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_document().walks.into_iter().find(|w| w.id == id))
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.read_document();
        let before = doc.walks.len();
        doc.walks.retain(|w| w.id != id);

        if doc.walks.len() == before {
            return Ok(false);
        }
        self.write_document(&doc)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::walk::WalkPoint;
    use tempfile::tempdir;

    fn walk(id: &str, start_time: i64) -> Walk {
        Walk {
            id: id.to_string(),
            pet_id: None,
            start_time,
            end_time: Some(start_time + 60_000),
            distance_meters: 420.5,
            duration_ms: 60_000,
            route: vec![WalkPoint { latitude: 52.0, longitude: 21.0, timestamp_ms: start_time }],
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> JsonWalkStore {
        JsonWalkStore::new(dir.path().join("walks.json").to_str().unwrap())
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.list_all().unwrap().is_empty());
        assert!(store.get_by_id("walk_1_1000").unwrap().is_none());
        assert!(!store.delete("walk_1_1000").unwrap());
    }

    #[test]
    fn test_save_and_round_trip() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let mut original = walk("walk_1_1234", 1000);
        original.pet_id = Some("pet_1_1000".to_string());
        store.save(&original).unwrap();

        let loaded = store.get_by_id("walk_1_1234").unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_list_sorted_by_start_time_descending() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&walk("walk_a", 1000)).unwrap();
        store.save(&walk("walk_c", 3000)).unwrap();
        store.save(&walk("walk_b", 2000)).unwrap();

        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["walk_c", "walk_b", "walk_a"]);
    }

    #[test]
    fn test_save_upserts_by_id() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&walk("walk_1", 1000)).unwrap();
        let mut updated = walk("walk_1", 1000);
        updated.distance_meters = 999.0;
        store.save(&updated).unwrap();

        let walks = store.list_all().unwrap();
        assert_eq!(walks.len(), 1);
        assert_eq!(walks[0].distance_meters, 999.0);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&walk("walk_1", 1000)).unwrap();
        store.save(&walk("walk_2", 2000)).unwrap();

        assert!(store.delete("walk_1").unwrap());
        assert!(!store.delete("walk_1").unwrap());

        let walks = store.list_all().unwrap();
        assert_eq!(walks.len(), 1);
        assert_eq!(walks[0].id, "walk_2");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("walks.json");
        let store = JsonWalkStore::new(nested.to_str().unwrap());

        store.save(&walk("walk_1", 1000)).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn test_document_shape() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&walk("walk_1", 1000)).unwrap();

        let content = fs::read_to_string(dir.path().join("walks.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["walks"][0]["id"], "walk_1");
        // Pretty-printed, same as the mobile app writes it
        assert!(content.contains('\n'));
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walks.json");
        fs::write(&path, "not json at all").unwrap();

        let store = JsonWalkStore::new(path.to_str().unwrap());
        assert!(store.list_all().unwrap().is_empty());

        store.save(&walk("walk_1", 1000)).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 1);
    }
}
