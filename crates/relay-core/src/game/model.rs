//! Game session data models

use crate::error::{RelayError, Result};
use crate::types::{DeviceId, GameId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of owners a session can have
pub const MAX_OWNERS: usize = 2;

/// A single game's shared state: owners, usernames, move history, PIN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Device identifiers authorized to mutate this session.
    /// Index 0 is the creator, index 1 the joiner. Length 0-2.
    pub owners: Vec<DeviceId>,
    /// Display names, index-aligned with `owners`.
    /// A missing username is stored as an empty string.
    pub usernames: Vec<String>,
    /// Opaque move tokens, append-only outside reset
    pub moves: Vec<String>,
    /// Optional invitation PIN, fixed at creation
    pub pin: Option<String>,
    /// Advertise in the open listing while single-owner.
    /// Cleared when a second player joins.
    #[serde(default)]
    pub open: bool,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last mutated
    pub updated_at: DateTime<Utc>,
}

/// How a start/join call was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A fresh session was created with the caller as player one
    Created,
    /// The caller already owned the session; nothing changed
    Rejoined,
    /// The caller was appended as player two
    Joined,
}

impl GameSession {
    /// Create a new single-owner session
    pub fn new(creator: DeviceId, username: &str, pin: Option<&str>, open: bool) -> Self {
        let now = Utc::now();
        Self {
            owners: vec![creator],
            usernames: vec![username.to_string()],
            moves: Vec::new(),
            pin: pin.filter(|p| !p.is_empty()).map(String::from),
            open,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark session as updated
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Check whether a device owns this session
    pub fn is_owner(&self, device: &DeviceId) -> bool {
        self.owners.contains(device)
    }

    /// Number of owners (0-2)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Whether the session should appear in the open listing
    pub fn is_listed_open(&self) -> bool {
        self.open && self.owners.len() == 1
    }

    /// Try to add `device` as the second player.
    ///
    /// Precedence: a repeat call from an existing owner is a no-op success
    /// before anything else is checked; a full session rejects before the PIN
    /// is verified. A successful join clears the `open` flag.
    pub fn try_join(
        &mut self,
        id: &GameId,
        device: &DeviceId,
        username: &str,
        pin: Option<&str>,
    ) -> Result<JoinOutcome> {
        if self.is_owner(device) {
            return Ok(JoinOutcome::Rejoined);
        }

        if self.owners.len() >= MAX_OWNERS {
            return Err(RelayError::GameFull(id.to_string()));
        }

        if let Some(expected) = &self.pin {
            if pin != Some(expected.as_str()) {
                return Err(RelayError::Unauthorized(format!(
                    "incorrect or missing invitation PIN for game '{}'",
                    id
                )));
            }
        }

        self.owners.push(device.clone());
        self.usernames.push(username.to_string());
        self.open = false;
        self.touch();
        Ok(JoinOutcome::Joined)
    }

    /// Append a move and return the updated move count
    pub fn record_move(&mut self, mv: &str) -> usize {
        self.moves.push(mv.to_string());
        self.touch();
        self.moves.len()
    }

    /// Last recorded move, if any
    pub fn last_move(&self) -> Option<&str> {
        self.moves.last().map(String::as_str)
    }

    /// Truncate the move history; owners, usernames and PIN are untouched
    pub fn reset(&mut self) {
        self.moves.clear();
        self.touch();
    }

    /// Get a read-only status projection
    pub fn status(&self) -> GameStatus {
        GameStatus::from(self)
    }
}

/// Read-only projection of a session for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatus {
    /// Current owners, creator first
    pub owners: Vec<DeviceId>,
    /// Display names, index-aligned with `owners`
    pub usernames: Vec<String>,
    /// Number of recorded moves
    pub move_count: usize,
}

impl From<&GameSession> for GameStatus {
    fn from(game: &GameSession) -> Self {
        Self {
            owners: game.owners.clone(),
            usernames: game.usernames.clone(),
            move_count: game.moves.len(),
        }
    }
}

/// Discovery listing entry for a joinable session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenGame {
    /// Session identifier
    pub game_id: GameId,
    /// Creator's display name
    pub username: String,
}
