use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::PersistenceGateway;
use crate::record::PersistedRecord;

/// Keeps the record as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceGateway for JsonFileStore {
    fn load(&mut self) -> Result<Option<PersistedRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read save file: {}", self.path.display()))?;
        let record: PersistedRecord = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse save file: {}", self.path.display()))?;
        Ok(Some(record))
    }

    fn save(&mut self, record: &PersistedRecord) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create save directory: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
        // Write a sibling file, then rename over the save.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write save file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace save file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("save.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("save.json"));

        let record = PersistedRecord {
            high_score: 12,
            total_games_played: 4,
            ..PersistedRecord::default()
        };
        store.save(&record).unwrap();

        assert_eq!(store.load().unwrap(), Some(record));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{\"high_score\": \"lots\"").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
    }
}
