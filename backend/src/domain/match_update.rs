//! Notifications emitted after every successful fixture write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Match, MatchId};

/// What changed on the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchUpdateKind {
    Created,
    Updated,
    ScoreChanged,
    StatusChanged,
    EventAdded,
    EventRemoved,
    Deleted,
}

/// Snapshot of a fixture after a write.
///
/// For [`MatchUpdateKind::Deleted`] the snapshot is the last stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub kind: MatchUpdateKind,
    #[schema(value_type = String, format = Uuid)]
    pub match_id: MatchId,
    #[serde(rename = "match")]
    pub fixture: Match,
    pub occurred_at: DateTime<Utc>,
}

impl MatchUpdate {
    /// Build an update for `fixture`.
    pub fn new(kind: MatchUpdateKind, fixture: Match, occurred_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            match_id: fixture.id,
            fixture,
            occurred_at,
        }
    }
}
