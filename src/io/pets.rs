//! Pet profile store - same JSON document pattern as the walk store

use crate::domain::pet::Pet;
use crate::io::store::StoreError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PetDocument {
    #[serde(default)]
    pets: Vec<Pet>,
}

/// File-backed pet store (`{"pets": [...]}`). Saving upserts by pet id.
pub struct JsonPetStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonPetStore {
    pub fn new(path: &str) -> Self {
        info!(path = %path, "pet_store_initialized");
        Self { path: PathBuf::from(path), lock: Mutex::new(()) }
    }

    fn read_document(&self) -> PetDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return PetDocument::default(),
        };
        match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "pet_store_unreadable");
                PetDocument::default()
            }
        }
    }

    fn write_document(&self, doc: &PetDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(doc)?)?;
        Ok(())
    }

    pub fn save(&self, pet: &Pet) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.read_document();

        match doc.pets.iter_mut().find(|p| p.id == pet.id) {
            Some(existing) => *existing = pet.clone(),
            None => doc.pets.push(pet.clone()),
        }

        self.write_document(&doc)
    }

    pub fn list_all(&self) -> Result<Vec<Pet>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_document().pets)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Pet>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_document().pets.into_iter().find(|p| p.id == id))
    }

    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.read_document();
        let before = doc.pets.len();
        doc.pets.retain(|p| p.id != id);

        if doc.pets.len() == before {
            return Ok(false);
        }
        self.write_document(&doc)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> JsonPetStore {
        JsonPetStore::new(dir.path().join("pets.json").to_str().unwrap())
    }

    #[test]
    fn test_save_and_get() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let pet = Pet::new("Reksio", "dog", "mixed", 1609459200000);
        store.save(&pet).unwrap();

        assert_eq!(store.get_by_id(&pet.id).unwrap().unwrap(), pet);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_save_upserts() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let mut pet = Pet::new("Luna", "dog", "border collie", 1609459200000);
        store.save(&pet).unwrap();

        pet.breed = "collie".to_string();
        store.save(&pet).unwrap();

        let pets = store.list_all().unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].breed, "collie");
    }

    #[test]
    fn test_delete_missing_is_false() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        assert!(!store.delete("pet_1_1000").unwrap());

        let pet = Pet::new("Burek", "dog", "mixed", 1609459200000);
        store.save(&pet).unwrap();
        assert!(store.delete(&pet.id).unwrap());
        assert!(store.list_all().unwrap().is_empty());
    }
}
