//! The [`SaveStore`] trait and its implementations.
//!
//! Stores are addressed by slot key. [`MemoryStore`] keeps encoded saves in
//! a map and is what tests use; [`FileStore`] writes one JSON file per slot
//! into a directory.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::save_file::{SaveFile, validate_slot};

/// Extension of save files written by [`FileStore`].
pub const SAVE_EXTENSION: &str = "json";

/// Persistence boundary for saved games.
pub trait SaveStore: Send + Sync {
    /// Load the save in `slot`, or `None` if the slot is empty.
    fn load(&self, slot: &str) -> impl Future<Output = Result<Option<SaveFile>, StoreError>> + Send;

    /// Write `file` into its slot, replacing any previous save.
    fn save(&self, file: &SaveFile) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove `slot`. Returns whether it existed.
    fn delete(&self, slot: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// All occupied slots, sorted.
    fn list(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store holding encoded saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    async fn load(&self, slot: &str) -> Result<Option<SaveFile>, StoreError> {
        validate_slot(slot)?;
        let slots = self.slots.read().await;
        slots
            .get(slot)
            .map(|json| SaveFile::from_json(slot, json))
            .transpose()
    }

    async fn save(&self, file: &SaveFile) -> Result<(), StoreError> {
        validate_slot(&file.slot)?;
        let json = file.to_json()?;
        self.slots.write().await.insert(file.slot.clone(), json);
        debug!(slot = %file.slot, "saved to memory");
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<bool, StoreError> {
        validate_slot(slot)?;
        Ok(self.slots.write().await.remove(slot).is_some())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.slots.read().await.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Store writing `<dir>/<slot>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so
/// a crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// A store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The save directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.{SAVE_EXTENSION}"))
    }
}

fn io_error(slot: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        slot: slot.to_owned(),
        source,
    }
}

impl SaveStore for FileStore {
    async fn load(&self, slot: &str) -> Result<Option<SaveFile>, StoreError> {
        validate_slot(slot)?;
        let json = match tokio::fs::read_to_string(self.path_for(slot)).await {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(slot)(err)),
        };
        SaveFile::from_json(slot, &json).map(Some)
    }

    async fn save(&self, file: &SaveFile) -> Result<(), StoreError> {
        let slot = file.slot.as_str();
        validate_slot(slot)?;
        let json = file.to_json()?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_error(slot))?;

        let target = self.path_for(slot);
        let staging = self.dir.join(format!(".{slot}.{SAVE_EXTENSION}.tmp"));
        tokio::fs::write(&staging, json)
            .await
            .map_err(io_error(slot))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(io_error(slot))?;
        info!(slot, path = %target.display(), "game saved");
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<bool, StoreError> {
        validate_slot(slot)?;
        match tokio::fs::remove_file(self.path_for(slot)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error(slot)(err)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error("*")(err)),
        };
        let mut slots = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error("*"))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if validate_slot(stem).is_ok() => slots.push(stem.to_owned()),
                _ => {}
            }
        }
        slots.sort();
        Ok(slots)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use estate_types::{GameSettings, GameTime, PlayerProfile, STATE_VERSION};

    use super::*;

    fn sample(slot: &str) -> SaveFile {
        let mut player = PlayerProfile::new("Robin");
        player.add_item("rope", 2);
        let state = estate_types::GameState::new(player, GameTime::default(), GameSettings::default());
        SaveFile::capture(slot, &state)
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("estate-store-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn memory_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load("autosave").await.unwrap().is_none());

        let file = sample("autosave");
        store.save(&file).await.unwrap();
        let loaded = store.load("autosave").await.unwrap().unwrap();
        assert_eq!(loaded, file);
        assert_eq!(store.list().await.unwrap(), vec![String::from("autosave")]);

        assert!(store.delete("autosave").await.unwrap());
        assert!(!store.delete("autosave").await.unwrap());
    }

    #[tokio::test]
    async fn memory_rejects_bad_slot() {
        let store = MemoryStore::new();
        let err = store.save(&sample("bad slot")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidSlot(_)));
    }

    #[tokio::test]
    async fn file_round_trip_and_listing() {
        let dir = scratch_dir();
        let store = FileStore::new(&dir);
        assert!(store.list().await.unwrap().is_empty());

        for slot in ["manual-2", "autosave"] {
            store.save(&sample(slot)).await.unwrap();
        }
        assert_eq!(
            store.list().await.unwrap(),
            vec![String::from("autosave"), String::from("manual-2")]
        );

        let loaded = store.load("autosave").await.unwrap().unwrap();
        assert_eq!(loaded.version, STATE_VERSION);
        assert_eq!(loaded.state.player.item_count("rope"), 2);

        assert!(store.delete("manual-2").await.unwrap());
        assert!(store.load("manual-2").await.unwrap().is_none());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn file_rejects_version_mismatch() {
        let dir = scratch_dir();
        let store = FileStore::new(&dir);
        let mut file = sample("old");
        file.version = 0;
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("old.json"), file.to_json().unwrap())
            .await
            .unwrap();

        let err = store.load("old").await.unwrap_err();
        assert!(matches!(err, StoreError::VersionMismatch { found: 0, .. }));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
