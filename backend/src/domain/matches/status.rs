//! Fixture lifecycle and its allowed transitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::validation::ValidationError;

/// Lifecycle state of a fixture.
///
/// ```text
/// scheduled -> live | postponed | cancelled
/// live      -> half_time | full_time
/// half_time -> live | full_time
/// postponed -> scheduled | cancelled
/// ```
/// `full_time` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    HalfTime,
    FullTime,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Scheduled,
        Self::Live,
        Self::HalfTime,
        Self::FullTime,
        Self::Postponed,
        Self::Cancelled,
    ];

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::HalfTime => "half_time",
            Self::FullTime => "full_time",
            Self::Postponed => "postponed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the snake_case name.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status",
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }

    /// Whether a fixture may move from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use MatchStatus::{Cancelled, FullTime, HalfTime, Live, Postponed, Scheduled};
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Scheduled, Live | Postponed | Cancelled)
                | (Live, HalfTime | FullTime)
                | (HalfTime, Live | FullTime)
                | (Postponed, Scheduled | Cancelled)
        )
    }

    /// Scores and events may only change once the fixture has kicked off.
    pub fn accepts_score_changes(self) -> bool {
        matches!(self, Self::Live | Self::HalfTime | Self::FullTime)
    }

    /// Fixture is currently being played.
    pub fn is_in_play(self) -> bool {
        matches!(self, Self::Live | Self::HalfTime)
    }

    /// No further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::FullTime | Self::Cancelled)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
