//! Game session module
//!
//! This module provides the session lifecycle for the two-player relay,
//! including ownership assignment, PIN gating, move history, and the
//! concurrent store that serializes access per session.
//!
//! # Overview
//!
//! A game session holds:
//! - The ordered owner pair (creator first, joiner second)
//! - Display names, index-aligned with the owners
//! - The opaque move history
//! - An optional invitation PIN and an open-for-discovery flag
//!
//! # Example
//!
//! ```ignore
//! use relay_core::game::GameStore;
//! use relay_core::types::{DeviceId, GameId};
//!
//! let store = GameStore::new();
//! let id = GameId::new("g1");
//!
//! store.create_or_join(&id, &DeviceId::new("A"), "alice", None, true)?;
//! store.join(&id, &DeviceId::new("B"), "bob", None)?;
//! store.record_move(&id, &DeviceId::new("A"), "e2e4")?;
//! ```

mod model;
mod store;

// Re-export public API
pub use model::{GameSession, GameStatus, JoinOutcome, OpenGame};
pub use store::GameStore;
