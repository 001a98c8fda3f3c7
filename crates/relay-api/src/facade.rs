//! Request handlers
//!
//! One handler per external operation. Each validates required fields,
//! delegates to the game store, and renders the outcome as an [`ApiResponse`].
//! Handlers never return `Err`: every domain error becomes an error envelope.

use crate::request::{GameQuery, JoinRequest, MoveRequest, OwnerRequest, StartRequest};
use crate::response::ApiResponse;
use relay_core::error::{RelayError, Result};
use relay_core::game::{GameStore, JoinOutcome};
use relay_core::types::{DeviceId, GameId};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Stateless facade over a shared game store
pub struct RelayApi {
    store: Arc<GameStore>,
}

/// Extract a required, non-empty field
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RelayError::InvalidInput(format!(
            "missing required field '{}'",
            name
        ))),
    }
}

impl RelayApi {
    /// Create a facade over the given store
    pub fn new(store: Arc<GameStore>) -> Self {
        Self { store }
    }

    /// Create a session, or join/rejoin it if the id already exists
    pub fn start(&self, req: &StartRequest) -> ApiResponse {
        self.try_start(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_start(&self, req: &StartRequest) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let device = DeviceId::new(required(&req.device_id, "device_id")?);
        let username = req.username.as_deref().unwrap_or("");

        let outcome =
            self.store
                .create_or_join(&id, &device, username, req.pin.as_deref(), req.open)?;

        let message = match outcome {
            JoinOutcome::Created => {
                info!(game_id = %id, device_id = %device, open = req.open, "game created");
                format!("Game '{}' created", id)
            }
            JoinOutcome::Rejoined => "Rejoined your own game".to_string(),
            JoinOutcome::Joined => {
                info!(game_id = %id, device_id = %device, "second player joined");
                "Joined as second player".to_string()
            }
        };
        Ok(ApiResponse::ok(json!({ "message": message })))
    }

    /// Join an existing session as the second player
    pub fn join(&self, req: &JoinRequest) -> ApiResponse {
        self.try_join(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_join(&self, req: &JoinRequest) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let device = DeviceId::new(required(&req.device_id, "device_id")?);
        let username = req.username.as_deref().unwrap_or("");

        let outcome = self.store.join(&id, &device, username, req.pin.as_deref())?;

        let message = match outcome {
            JoinOutcome::Rejoined => "Rejoined your own game".to_string(),
            _ => {
                info!(game_id = %id, device_id = %device, "second player joined");
                format!("Joined game '{}' as second player", id)
            }
        };
        Ok(ApiResponse::ok(json!({ "message": message })))
    }

    /// Record a move on behalf of an owner
    pub fn record_move(&self, req: &MoveRequest) -> ApiResponse {
        self.try_record_move(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_record_move(&self, req: &MoveRequest) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let device = DeviceId::new(required(&req.device_id, "device_id")?);
        let mv = required(&req.mv, "move")?;

        let count = self.store.record_move(&id, &device, mv)?;
        info!(game_id = %id, device_id = %device, move_count = count, "move recorded");

        Ok(ApiResponse::ok(json!({
            "message": format!("Move '{}' recorded", mv)
        })))
    }

    /// Last move of a session, or null if none were recorded yet
    pub fn last_move(&self, req: &GameQuery) -> ApiResponse {
        self.try_last_move(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_last_move(&self, req: &GameQuery) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let mv = self.store.last_move(&id)?;
        Ok(ApiResponse::ok(json!({ "move": mv })))
    }

    /// Full ordered move history of a session
    pub fn moves(&self, req: &GameQuery) -> ApiResponse {
        self.try_moves(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_moves(&self, req: &GameQuery) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let moves = self.store.moves(&id)?;
        Ok(ApiResponse::ok(json!({ "moves": moves })))
    }

    /// Truncate a session's move history
    pub fn reset(&self, req: &OwnerRequest) -> ApiResponse {
        self.try_reset(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_reset(&self, req: &OwnerRequest) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let device = DeviceId::new(required(&req.device_id, "device_id")?);

        self.store.reset(&id, &device)?;
        info!(game_id = %id, device_id = %device, "game reset");

        Ok(ApiResponse::ok(json!({
            "message": format!("Game '{}' reset", id)
        })))
    }

    /// Delete a session entirely
    pub fn delete(&self, req: &OwnerRequest) -> ApiResponse {
        self.try_delete(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_delete(&self, req: &OwnerRequest) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let device = DeviceId::new(required(&req.device_id, "device_id")?);

        self.store.delete(&id, &device)?;
        info!(game_id = %id, device_id = %device, "game deleted");

        Ok(ApiResponse::ok(json!({
            "message": format!("Game '{}' deleted", id)
        })))
    }

    /// Detailed status of one session
    pub fn status(&self, req: &GameQuery) -> ApiResponse {
        self.try_status(req)
            .unwrap_or_else(|e| ApiResponse::from_error(&e))
    }

    fn try_status(&self, req: &GameQuery) -> Result<ApiResponse> {
        let id = GameId::new(required(&req.game_id, "game_id")?);
        let status = self.store.status(&id)?;
        Ok(ApiResponse::ok(json!({
            "game_id": id,
            "owners": status.owners,
            "usernames": status.usernames,
            "move_count": status.move_count,
        })))
    }

    /// All known game ids
    pub fn games(&self) -> ApiResponse {
        ApiResponse::ok(json!({ "games": self.store.game_ids() }))
    }

    /// Sessions advertised for discovery
    pub fn open_games(&self) -> ApiResponse {
        ApiResponse::ok(json!({ "open_games": self.store.open_games() }))
    }
}
