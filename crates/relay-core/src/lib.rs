//! relay-core - Core library for duo-relay
//!
//! This crate provides the core business logic for the two-player game relay,
//! including the session data model, the authorization state machine, and the
//! concurrent game store.

pub mod config;
pub mod error;
pub mod game;
pub mod types;

pub use error::{RelayError, Result};
pub use types::*;
