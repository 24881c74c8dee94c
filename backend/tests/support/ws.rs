//! WebSocket-focused test helpers.
//!
//! Integration tests under `backend/tests/` compile as separate crates, so
//! the handshake state is built in one place.

use std::sync::Arc;

use pitchside::inbound::ws::state::{AllowedOrigins, WsState};
use pitchside::outbound::broadcast::MatchUpdateHub;

/// Build a `WsState` over a fresh hub accepting `origins`.
pub fn ws_state(origins: &[&str]) -> WsState {
    let origins = AllowedOrigins::parse(origins.iter().copied()).expect("valid origins");
    WsState::new(Arc::new(MatchUpdateHub::default()), origins)
}
