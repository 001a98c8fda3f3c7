//! relay-storage - Storage library for duo-relay
//!
//! This crate persists the game store as a directory of JSON records, one per
//! session, and decides when a new snapshot is due.

mod snapshot;

pub use snapshot::{FileSnapshotStorage, Snapshotter, CURRENT_RECORD_VERSION};
