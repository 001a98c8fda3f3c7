//! File system snapshot storage for the game store

use relay_core::error::{RelayError, Result};
use relay_core::game::{GameSession, GameStore};
use relay_core::types::GameId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Current on-disk record version
pub const CURRENT_RECORD_VERSION: u32 = 1;

/// On-disk form of one session.
///
/// The game id is stored in the record body rather than derived from the
/// filename: record files are named by a hash of the id, so caller-supplied
/// ids cannot escape the records directory or collide with temp files.
#[derive(Debug, Serialize, Deserialize)]
struct GameRecord {
    record_version: u32,
    game_id: GameId,
    game: GameSession,
}

impl GameRecord {
    fn new(game_id: GameId, game: GameSession) -> Self {
        Self {
            record_version: CURRENT_RECORD_VERSION,
            game_id,
            game,
        }
    }
}

/// File system based snapshot storage: one JSON record per session
pub struct FileSnapshotStorage {
    /// Base directory for storage
    base_dir: PathBuf,
    /// Records subdirectory
    records_dir: PathBuf,
}

impl FileSnapshotStorage {
    /// Create a new file system snapshot storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let records_dir = base_dir.join("games");

        let storage = Self {
            base_dir,
            records_dir,
        };

        storage.ensure_dirs()?;
        Ok(storage)
    }

    /// Create storage with default directory (~/.duo-relay)
    pub fn default_location() -> Result<Self> {
        let base_dir = directories::ProjectDirs::from("com", "duo-relay", "duo-relay")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".duo-relay")
            });

        Self::new(base_dir)
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.records_dir.exists() {
            fs::create_dir_all(&self.records_dir).map_err(|e| {
                RelayError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create records directory: {}", e),
                ))
            })?;
            debug!("Created records directory: {:?}", self.records_dir);
        }
        Ok(())
    }

    /// Filename for a record, derived from a hash of the game id
    fn record_file_name(id: &GameId) -> String {
        let hash = blake3::hash(id.as_str().as_bytes());
        format!("g_{}.json", &hash.to_hex()[..16])
    }

    /// Get the path for a session's record file
    fn record_path(&self, id: &GameId) -> PathBuf {
        self.records_dir.join(Self::record_file_name(id))
    }

    /// Get a temporary path for atomic writes
    fn temp_path(&self, id: &GameId) -> PathBuf {
        self.records_dir
            .join(format!(".{}.tmp", Self::record_file_name(id)))
    }

    /// Write one record atomically (write to temp, then rename)
    fn atomic_write(&self, id: &GameId, game: &GameSession) -> Result<()> {
        let temp_path = self.temp_path(id);
        let final_path = self.record_path(id);

        let record = GameRecord::new(id.clone(), game.clone());

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, &record)?;
        writer.flush()?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, &final_path).map_err(|e| {
            // Clean up temp file on failure
            let _ = fs::remove_file(&temp_path);
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!("Saved game {} to {:?}", id, final_path);
        Ok(())
    }

    /// Read and parse one record file
    fn read_record(&self, path: &PathBuf) -> Result<(GameId, GameSession)> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let record: GameRecord = serde_json::from_reader(reader)?;

        if record.record_version != CURRENT_RECORD_VERSION {
            return Err(RelayError::UnsupportedSnapshotVersion(
                record.record_version,
            ));
        }

        Ok((record.game_id, record.game))
    }

    /// Load the full session map from disk.
    ///
    /// A missing records directory yields an empty map. Malformed or
    /// unsupported records are logged and skipped so one bad file never takes
    /// the whole snapshot down.
    pub fn load_all(&self) -> Result<HashMap<GameId, GameSession>> {
        let mut sessions = HashMap::new();

        if !self.records_dir.exists() {
            return Ok(sessions);
        }

        let entries = fs::read_dir(&self.records_dir).map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read records directory: {}", e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip non-json files and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match self.read_record(&path) {
                Ok((id, game)) => {
                    sessions.insert(id, game);
                }
                Err(e) => {
                    warn!("Failed to read record file {:?}: {}", path, e);
                }
            }
        }

        info!("Loaded {} game(s) from {:?}", sessions.len(), self.records_dir);
        Ok(sessions)
    }

    /// Persist the full session map.
    ///
    /// Writes each record atomically, then removes record files whose session
    /// no longer exists so deleted games do not resurrect on the next load.
    pub fn save_all(&self, sessions: &HashMap<GameId, GameSession>) -> Result<()> {
        self.ensure_dirs()?;

        let mut expected: HashSet<String> = HashSet::with_capacity(sessions.len());
        for (id, game) in sessions {
            self.atomic_write(id, game)?;
            expected.insert(Self::record_file_name(id));
        }

        for entry in fs::read_dir(&self.records_dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }
            if !expected.contains(name) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to remove stale record {:?}: {}", path, e);
                }
            }
        }

        debug!("Saved {} game(s) to {:?}", sessions.len(), self.records_dir);
        Ok(())
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get records directory
    pub fn records_dir(&self) -> &PathBuf {
        &self.records_dir
    }
}

/// Decides when the store is due for a snapshot.
///
/// Persistence stays best-effort: a crash between snapshots loses the
/// mutations since the last save. The threshold only bounds how many.
pub struct Snapshotter {
    storage: FileSnapshotStorage,
    /// Save after this many mutations; 0 disables mutation-triggered saves
    every_mutations: u64,
    /// Store mutation count at the last save
    last_saved: AtomicU64,
}

impl Snapshotter {
    /// Create a snapshotter over the given storage
    pub fn new(storage: FileSnapshotStorage, every_mutations: u64) -> Self {
        Self {
            storage,
            every_mutations,
            last_saved: AtomicU64::new(0),
        }
    }

    /// Save if enough mutations accumulated since the last save.
    ///
    /// Returns whether a snapshot was written.
    pub fn maybe_save(&self, store: &GameStore) -> Result<bool> {
        if self.every_mutations == 0 {
            return Ok(false);
        }

        let seen = store.mutation_count();
        let last = self.last_saved.load(Ordering::Relaxed);
        if seen.saturating_sub(last) < self.every_mutations {
            return Ok(false);
        }

        self.save(store)?;
        Ok(true)
    }

    /// Unconditionally snapshot the store (graceful-shutdown path)
    pub fn save(&self, store: &GameStore) -> Result<()> {
        let count = store.mutation_count();
        self.storage.save_all(&store.export())?;
        self.last_saved.store(count, Ordering::Relaxed);
        Ok(())
    }

    /// Get access to the underlying storage
    pub fn storage(&self) -> &FileSnapshotStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::types::DeviceId;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileSnapshotStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSnapshotStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn populated_store() -> GameStore {
        let store = GameStore::new();
        store
            .create_or_join(
                &GameId::new("g1"),
                &DeviceId::new("A"),
                "alice",
                Some("1234"),
                true,
            )
            .unwrap();
        store
            .create_or_join(&GameId::new("g2"), &DeviceId::new("B"), "bob", None, false)
            .unwrap();
        store
            .record_move(&GameId::new("g1"), &DeviceId::new("A"), "X1")
            .unwrap();
        store
    }

    #[test]
    fn test_storage_creation() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.records_dir().exists());
    }

    #[test]
    fn test_record_path_is_hashed() {
        let (storage, _temp) = create_test_storage();
        let path = storage.record_path(&GameId::new("../escape"));

        // The id never appears in the filename
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("g_"));
        assert!(name.ends_with(".json"));
        assert_eq!(path.parent().unwrap(), storage.records_dir());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (storage, _temp) = create_test_storage();
        let store = populated_store();
        let snapshot = store.export();

        storage.save_all(&snapshot).unwrap();
        let loaded = storage.load_all().unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_load_from_empty_dir() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_from_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSnapshotStorage::new(temp_dir.path()).unwrap();
        fs::remove_dir_all(storage.records_dir()).unwrap();

        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let (storage, _temp) = create_test_storage();
        let store = populated_store();
        storage.save_all(&store.export()).unwrap();

        fs::write(storage.records_dir().join("g_deadbeef00000000.json"), "{not json")
            .unwrap();

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_unsupported_version_is_skipped() {
        let (storage, _temp) = create_test_storage();
        let store = populated_store();
        storage.save_all(&store.export()).unwrap();

        let record_path = storage.record_path(&GameId::new("g2"));
        let content = fs::read_to_string(&record_path).unwrap();
        let bumped = content.replace("\"record_version\": 1", "\"record_version\": 99");
        fs::write(&record_path, bumped).unwrap();

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key(&GameId::new("g1")));
    }

    #[test]
    fn test_save_removes_stale_records() {
        let (storage, _temp) = create_test_storage();
        let store = populated_store();
        storage.save_all(&store.export()).unwrap();

        store
            .delete(&GameId::new("g2"), &DeviceId::new("B"))
            .unwrap();
        storage.save_all(&store.export()).unwrap();

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.contains_key(&GameId::new("g2")));
    }

    #[test]
    fn test_ignores_temp_and_foreign_files() {
        let (storage, _temp) = create_test_storage();
        fs::write(storage.records_dir().join(".g_abc.json.tmp"), "{}").unwrap();
        fs::write(storage.records_dir().join("readme.txt"), "test").unwrap();

        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_into_fresh_store() {
        let (storage, _temp) = create_test_storage();
        let store = populated_store();
        storage.save_all(&store.export()).unwrap();

        let restored = GameStore::from_snapshot(storage.load_all().unwrap());
        assert_eq!(
            restored
                .last_move(&GameId::new("g1"))
                .unwrap(),
            Some("X1".to_string())
        );
        assert_eq!(restored.export(), store.export());
    }

    #[test]
    fn test_snapshotter_threshold() {
        let (storage, _temp) = create_test_storage();
        let snapshotter = Snapshotter::new(storage, 2);
        let store = GameStore::new();

        // Below threshold: no save
        store
            .create_or_join(&GameId::new("g1"), &DeviceId::new("A"), "alice", None, false)
            .unwrap();
        assert!(!snapshotter.maybe_save(&store).unwrap());

        // At threshold: saves
        store
            .record_move(&GameId::new("g1"), &DeviceId::new("A"), "X1")
            .unwrap();
        assert!(snapshotter.maybe_save(&store).unwrap());

        // Counter rebased: immediately after, no save
        assert!(!snapshotter.maybe_save(&store).unwrap());

        let loaded = snapshotter.storage().load_all().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_snapshotter_disabled() {
        let (storage, _temp) = create_test_storage();
        let snapshotter = Snapshotter::new(storage, 0);
        let store = populated_store();

        assert!(!snapshotter.maybe_save(&store).unwrap());
        assert!(snapshotter.storage().load_all().unwrap().is_empty());

        // Explicit save still works
        snapshotter.save(&store).unwrap();
        assert_eq!(snapshotter.storage().load_all().unwrap().len(), 2);
    }
}
