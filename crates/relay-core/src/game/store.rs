//! Concurrent store of game sessions

use super::model::{GameSession, GameStatus, JoinOutcome, OpenGame};
use crate::error::{RelayError, Result};
use crate::types::{DeviceId, GameId};
use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared, concurrency-safe mapping from game id to session state.
///
/// Each session sits behind its own mutex so that mutating operations on one
/// id serialize against each other while operations on distinct ids run in
/// parallel. Lock ordering: session mutexes are only acquired while holding
/// the map lock (read for per-session operations, write for create and
/// delete) and are released before the map lock is.
pub struct GameStore {
    /// Backing map of sessions
    games: RwLock<HashMap<GameId, Arc<Mutex<GameSession>>>>,
    /// Successful mutations since construction, for snapshot triggering
    mutations: AtomicU64,
}

impl GameStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            mutations: AtomicU64::new(0),
        }
    }

    /// Create a store pre-populated from a persisted snapshot
    pub fn from_snapshot(sessions: HashMap<GameId, GameSession>) -> Self {
        let store = Self::new();
        store.load_snapshot(sessions);
        store
    }

    /// Replace the backing map with a persisted snapshot
    pub fn load_snapshot(&self, sessions: HashMap<GameId, GameSession>) {
        let mut games = self.games.write();
        games.clear();
        for (id, game) in sessions {
            games.insert(id, Arc::new(Mutex::new(game)));
        }
    }

    /// Run a closure against one session under its lock
    fn with_game<T>(
        &self,
        id: &GameId,
        f: impl FnOnce(&mut GameSession) -> Result<T>,
    ) -> Result<T> {
        let games = self.games.read();
        let cell = games
            .get(id)
            .ok_or_else(|| RelayError::GameNotFound(id.to_string()))?;
        let mut game = cell.lock();
        f(&mut game)
    }

    fn bump(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a session for a fresh id, or join/rejoin an existing one.
    ///
    /// The existing-id branch follows the same precedence as [`Self::join`]:
    /// rejoin before capacity before PIN.
    pub fn create_or_join(
        &self,
        id: &GameId,
        device: &DeviceId,
        username: &str,
        pin: Option<&str>,
        open: bool,
    ) -> Result<JoinOutcome> {
        {
            let games = self.games.read();
            if let Some(cell) = games.get(id) {
                let mut game = cell.lock();
                return self.join_locked(&mut game, id, device, username, pin);
            }
        }

        // The id was absent under the read lock; re-check under the write
        // lock so two concurrent creates converge on a single session.
        let mut games = self.games.write();
        match games.entry(id.clone()) {
            Entry::Occupied(entry) => {
                let cell = entry.get();
                let mut game = cell.lock();
                self.join_locked(&mut game, id, device, username, pin)
            }
            Entry::Vacant(entry) => {
                let game = GameSession::new(device.clone(), username, pin, open);
                entry.insert(Arc::new(Mutex::new(game)));
                self.bump();
                debug!(game_id = %id, device_id = %device, "game created");
                Ok(JoinOutcome::Created)
            }
        }
    }

    /// Join an existing session as the second player.
    ///
    /// Unlike [`Self::create_or_join`] this never creates: an unknown id is
    /// an error. A repeat call from a current owner is a no-op success.
    pub fn join(
        &self,
        id: &GameId,
        device: &DeviceId,
        username: &str,
        pin: Option<&str>,
    ) -> Result<JoinOutcome> {
        let games = self.games.read();
        let cell = games
            .get(id)
            .ok_or_else(|| RelayError::GameNotFound(id.to_string()))?;
        let mut game = cell.lock();
        self.join_locked(&mut game, id, device, username, pin)
    }

    fn join_locked(
        &self,
        game: &mut GameSession,
        id: &GameId,
        device: &DeviceId,
        username: &str,
        pin: Option<&str>,
    ) -> Result<JoinOutcome> {
        let outcome = game.try_join(id, device, username, pin)?;
        if outcome == JoinOutcome::Joined {
            self.bump();
        }
        Ok(outcome)
    }

    /// Append a move on behalf of an owner; returns the updated move count
    pub fn record_move(&self, id: &GameId, device: &DeviceId, mv: &str) -> Result<usize> {
        if mv.is_empty() {
            return Err(RelayError::InvalidInput("move must not be empty".to_string()));
        }

        let count = self.with_game(id, |game| {
            if !game.is_owner(device) {
                return Err(RelayError::Unauthorized(format!(
                    "device '{}' does not own game '{}'",
                    device, id
                )));
            }
            Ok(game.record_move(mv))
        })?;
        self.bump();
        Ok(count)
    }

    /// Last move of a session, or `None` if no moves were recorded yet
    pub fn last_move(&self, id: &GameId) -> Result<Option<String>> {
        self.with_game(id, |game| Ok(game.last_move().map(String::from)))
    }

    /// Ordered snapshot of a session's full move history
    pub fn moves(&self, id: &GameId) -> Result<Vec<String>> {
        self.with_game(id, |game| Ok(game.moves.clone()))
    }

    /// Truncate a session's move history; owner-only
    pub fn reset(&self, id: &GameId, device: &DeviceId) -> Result<()> {
        self.with_game(id, |game| {
            if !game.is_owner(device) {
                return Err(RelayError::Unauthorized(format!(
                    "device '{}' does not own game '{}'",
                    device, id
                )));
            }
            game.reset();
            Ok(())
        })?;
        self.bump();
        Ok(())
    }

    /// Remove a session entirely; owner-only and irreversible
    pub fn delete(&self, id: &GameId, device: &DeviceId) -> Result<()> {
        let mut games = self.games.write();
        let cell = games
            .get(id)
            .ok_or_else(|| RelayError::GameNotFound(id.to_string()))?;
        {
            let game = cell.lock();
            if !game.is_owner(device) {
                return Err(RelayError::Unauthorized(format!(
                    "device '{}' does not own game '{}'",
                    device, id
                )));
            }
        }
        games.remove(id);
        self.bump();
        debug!(game_id = %id, device_id = %device, "game deleted");
        Ok(())
    }

    /// Read-only status projection of a session
    pub fn status(&self, id: &GameId) -> Result<GameStatus> {
        self.with_game(id, |game| Ok(game.status()))
    }

    /// All known game ids, in no particular order
    pub fn game_ids(&self) -> Vec<GameId> {
        let games = self.games.read();
        games.keys().cloned().collect()
    }

    /// Sessions advertised for discovery: marked open and single-owner
    pub fn open_games(&self) -> Vec<OpenGame> {
        let games = self.games.read();
        games
            .iter()
            .filter_map(|(id, cell)| {
                let game = cell.lock();
                game.is_listed_open().then(|| OpenGame {
                    game_id: id.clone(),
                    username: game.usernames.first().cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Consistent clone of the whole map, for persistence.
    ///
    /// Holds the map read lock and each session's lock while cloning, so no
    /// session is ever captured mid-mutation.
    pub fn export(&self) -> HashMap<GameId, GameSession> {
        let games = self.games.read();
        games
            .iter()
            .map(|(id, cell)| (id.clone(), cell.lock().clone()))
            .collect()
    }

    /// Successful mutations since construction
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }

    /// Number of sessions in the store
    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    /// Check whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.games.read().is_empty()
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}
