//! Wire-level message definitions for the WebSocket adapter.
//!
//! Clients send `{"action": ...}` requests; the server answers with
//! `{"type": ...}` payloads. Match updates are flattened next to the tag.

use serde::{Deserialize, Serialize};

use crate::domain::{MatchId, MatchUpdate};

/// Request sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Receive updates for one fixture only.
    Subscribe {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    /// Receive updates for every fixture again.
    Unsubscribe,
}

/// Payload pushed to a client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage<'a> {
    MatchUpdate(&'a MatchUpdate),
    Subscribed {
        #[serde(rename = "matchId")]
        match_id: MatchId,
    },
    Unsubscribed,
}
