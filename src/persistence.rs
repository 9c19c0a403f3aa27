use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::models::Dataset;

pub const DATASET_KEY: &str = "campusNexusData";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn load_dataset(store: &dyn KeyValueStore) -> Result<Dataset, PersistenceError> {
    match store.get(DATASET_KEY)? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Dataset::default()),
    }
}

pub fn save_dataset(store: &mut dyn KeyValueStore, data: &Dataset) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(data)?;
    store.set(DATASET_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::fixtures::two_clubs;
    use crate::models::{ClassYear, SCHEMA_VERSION};

    #[test]
    fn file_store_round_trips_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data"));
        let data = two_clubs();
        save_dataset(&mut store, &data).unwrap();

        let loaded = load_dataset(&store).unwrap();
        assert_eq!(loaded, data);
        assert!(dir.path().join("data/campusNexusData.json").exists());
    }

    #[test]
    fn missing_document_loads_empty() {
        let store = MemoryStore::new();
        let loaded = load_dataset(&store).unwrap();
        assert!(loaded.students.is_empty());
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn partial_document_defaults_missing_fields() {
        let mut store = MemoryStore::new();
        let raw = r#"{"students":[{"id":"s1","name":"Quinn Davis","email":"q@u.edu",
            "major":"Physics","year":"Senior","engagement":61.5}]}"#;
        store.set(DATASET_KEY, raw).unwrap();

        let loaded = load_dataset(&store).unwrap();
        assert_eq!(loaded.students.len(), 1);
        assert_eq!(loaded.students[0].year, ClassYear::Senior);
        assert!(loaded.clubs.is_empty());
        assert!(loaded.current_user.is_none());
        assert!(loaded.filters.is_empty());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(DATASET_KEY, "{not json").unwrap();
        assert!(matches!(load_dataset(&store), Err(PersistenceError::Json(_))));
    }
}
