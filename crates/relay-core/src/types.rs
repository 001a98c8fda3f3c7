//! Core type definitions for duo-relay

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a game session, supplied by the caller.
///
/// Opaque to the relay; uniqueness within the store is the only requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub String);

impl GameId {
    /// Create a GameId from a string
    pub fn new(s: impl Into<String>) -> Self {
        GameId(s.into())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        GameId(s.to_string())
    }
}

/// Opaque device identifier standing in for account identity.
///
/// Not verified in any way: whoever knows a device id can act as that device.
/// This weak model is inherited from the source system and preserved on
/// purpose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Create a DeviceId from a string
    pub fn new(s: impl Into<String>) -> Self {
        DeviceId(s.into())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId(s.to_string())
    }
}
