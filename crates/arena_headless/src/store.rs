//! JSON file roster store.

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::prelude::{ArenaError, Blueprint, RosterStore};

/// Saves the player roster as a pretty-printed JSON array of blueprints.
///
/// A missing file reads as an empty roster.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`. Nothing is read until [`RosterStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStore for JsonFileStore {
    fn load(&self) -> arena_core::error::Result<Vec<Blueprint>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path).map_err(|e| {
            ArenaError::Persistence(format!("reading {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            ArenaError::Persistence(format!("decoding {}: {e}", self.path.display()))
        })
    }

    fn save(&mut self, blueprints: &[Blueprint]) -> arena_core::error::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ArenaError::Persistence(format!("creating {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(blueprints)
            .map_err(|e| ArenaError::Persistence(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            ArenaError::Persistence(format!("writing {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), count = blueprints.len(), "Roster saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::store::load_or_empty;
    use arena_test_utils::fixtures::player;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("roster.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("roster.json"));
        let roster = vec![
            player("a", "knight", 272.0, 332.0),
            player("b", "archer", 336.0, 396.0),
        ];

        store.save(&roster).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), roster);
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(ArenaError::Persistence(_))));
        assert!(load_or_empty(&store).is_empty());
    }
}
