//! Typed request bodies
//!
//! Every field the wire treats as optional is an `Option` here; the facade
//! decides which ones are actually required for each operation.

use serde::Deserialize;

/// Body of a create-or-join (`start`) request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    /// Session identifier (required)
    pub game_id: Option<String>,
    /// Caller's device identifier (required)
    pub device_id: Option<String>,
    /// Display name; stored as empty if absent
    pub username: Option<String>,
    /// Invitation PIN for later joiners
    pub pin: Option<String>,
    /// Advertise the session in the open listing
    #[serde(default)]
    pub open: bool,
}

/// Body of a join request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinRequest {
    /// Session identifier (required)
    pub game_id: Option<String>,
    /// Caller's device identifier (required)
    pub device_id: Option<String>,
    /// Display name; stored as empty if absent
    pub username: Option<String>,
    /// Invitation PIN, if the session has one
    pub pin: Option<String>,
}

/// Body of a move submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveRequest {
    /// Session identifier (required)
    pub game_id: Option<String>,
    /// Caller's device identifier (required)
    pub device_id: Option<String>,
    /// Opaque move token (required, non-empty)
    #[serde(rename = "move")]
    pub mv: Option<String>,
}

/// Body of an owner-only action (reset, delete)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerRequest {
    /// Session identifier (required)
    pub game_id: Option<String>,
    /// Caller's device identifier (required)
    pub device_id: Option<String>,
}

/// Query for read-only session lookups (last-move, moves, status)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameQuery {
    /// Session identifier (required)
    pub game_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_minimal() {
        let req: StartRequest =
            serde_json::from_str(r#"{"game_id":"g1","device_id":"A"}"#).unwrap();
        assert_eq!(req.game_id.as_deref(), Some("g1"));
        assert!(req.username.is_none());
        assert!(req.pin.is_none());
        assert!(!req.open);
    }

    #[test]
    fn test_start_request_full() {
        let req: StartRequest = serde_json::from_str(
            r#"{"game_id":"g1","device_id":"A","username":"alice","pin":"1234","open":true}"#,
        )
        .unwrap();
        assert_eq!(req.username.as_deref(), Some("alice"));
        assert_eq!(req.pin.as_deref(), Some("1234"));
        assert!(req.open);
    }

    #[test]
    fn test_move_field_name() {
        let req: MoveRequest =
            serde_json::from_str(r#"{"game_id":"g1","device_id":"A","move":"e2e4"}"#).unwrap();
        assert_eq!(req.mv.as_deref(), Some("e2e4"));
    }

    #[test]
    fn test_missing_fields_deserialize_to_none() {
        let req: OwnerRequest = serde_json::from_str("{}").unwrap();
        assert!(req.game_id.is_none());
        assert!(req.device_id.is_none());
    }
}
