//! relay-api - Session API facade for duo-relay
//!
//! This crate translates external requests into game store operations and
//! maps outcomes to a status-coded response envelope. It holds no business
//! state; wire framing (HTTP routing, CORS) is left to the embedding server.

mod facade;
mod request;
mod response;

pub use facade::RelayApi;
pub use request::{GameQuery, JoinRequest, MoveRequest, OwnerRequest, StartRequest};
pub use response::ApiResponse;
