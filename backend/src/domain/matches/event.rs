//! Events recorded against a fixture and their effect on the score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::MatchEventId;
use crate::domain::validation::{ValidationError, bounded_text, optional_text};

/// Latest minute accepted for events and the match clock, stoppage included.
pub const MINUTE_MAX: u16 = 130;
/// Maximum length of a player name.
pub const PLAYER_NAME_MAX: usize = 60;

/// Side of the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

/// Kind of match event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    OwnGoal,
    Penalty,
    MissedPenalty,
    YellowCard,
    RedCard,
    Substitution,
}

impl EventType {
    /// Side credited with a goal when a player of `team` is involved.
    ///
    /// Own goals count for the opponent; non-scoring events return `None`.
    pub fn scoring_side(self, team: Side) -> Option<Side> {
        match self {
            Self::Goal | Self::Penalty => Some(team),
            Self::OwnGoal => Some(team.opposite()),
            Self::MissedPenalty | Self::YellowCard | Self::RedCard | Self::Substitution => None,
        }
    }
}

/// Event stored on a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    #[schema(value_type = String, format = Uuid)]
    pub id: MatchEventId,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub team: Side,
    pub player: String,
    pub minute: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_out: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated event submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatchEvent {
    pub event_type: EventType,
    pub team: Side,
    pub player: String,
    pub minute: u16,
    pub assist: Option<String>,
    pub player_out: Option<String>,
}

impl NewMatchEvent {
    /// Validate an event submission.
    ///
    /// `assist` is only meaningful for goals; `player_out` is required for
    /// substitutions and rejected otherwise.
    pub fn try_new(
        event_type: EventType,
        team: Side,
        player: &str,
        minute: u16,
        assist: Option<&str>,
        player_out: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let player = bounded_text("player", player, 1, PLAYER_NAME_MAX)?;
        if minute > MINUTE_MAX {
            return Err(ValidationError::OutOfRange {
                field: "minute",
                min: 0,
                max: i64::from(MINUTE_MAX),
            });
        }
        let assist = optional_text("assist", assist, PLAYER_NAME_MAX)?;
        if assist.is_some() && event_type != EventType::Goal {
            return Err(ValidationError::invalid("assist", "is only allowed on goals"));
        }
        let player_out = optional_text("playerOut", player_out, PLAYER_NAME_MAX)?;
        match (event_type, &player_out) {
            (EventType::Substitution, None) => {
                return Err(ValidationError::Blank { field: "playerOut" });
            }
            (EventType::Substitution, Some(_)) | (_, None) => {}
            (_, Some(_)) => {
                return Err(ValidationError::invalid(
                    "playerOut",
                    "is only allowed on substitutions",
                ));
            }
        }
        Ok(Self {
            event_type,
            team,
            player,
            minute,
            assist,
            player_out,
        })
    }

    /// Materialise the event with its identifier and timestamp.
    pub fn into_event(self, id: MatchEventId, created_at: DateTime<Utc>) -> MatchEvent {
        MatchEvent {
            id,
            event_type: self.event_type,
            team: self.team,
            player: self.player,
            minute: self.minute,
            assist: self.assist,
            player_out: self.player_out,
            created_at,
        }
    }
}
