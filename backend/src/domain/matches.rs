//! Fixture aggregate: details, lifecycle, score and events.
//!
//! All score bookkeeping happens here so that persistence adapters only ever
//! store a consistent snapshot. Rule violations are reported as
//! [`MatchRuleError`] and mapped to the API envelope by the match service.

mod event;
mod sheet;
mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::reference_data::{competition, nigerian_state};
use crate::domain::validation::{ValidationError, bounded_text};
use crate::domain::{Error, MatchEventId, MatchId};

pub use self::event::{EventType, MINUTE_MAX, MatchEvent, NewMatchEvent, Side};
pub use self::sheet::{Lineups, MatchStats, TeamLineup, TeamStats};
pub use self::status::MatchStatus;

/// Minimum length of a team name.
pub const TEAM_MIN: usize = 2;
/// Maximum length of a team name.
pub const TEAM_MAX: usize = 60;
/// Minimum length of a venue name.
pub const VENUE_MIN: usize = 2;
/// Maximum length of a venue name.
pub const VENUE_MAX: usize = 100;

/// A fixture with its live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[schema(value_type = String, format = Uuid)]
    pub id: MatchId,
    #[schema(example = "Enyimba")]
    pub home_team: String,
    #[schema(example = "Kano Pillars")]
    pub away_team: String,
    #[schema(example = "NPFL")]
    pub competition: String,
    #[schema(example = "Enyimba International Stadium")]
    pub venue: String,
    #[schema(example = "Abia")]
    pub state: String,
    pub kickoff: DateTime<Utc>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u16>,
    pub home_score: u32,
    pub away_score: u32,
    #[serde(default)]
    pub events: Vec<MatchEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineups: Option<Lineups>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<MatchStats>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rule violations raised by [`Match`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchRuleError {
    /// Scores and events are locked until kick-off.
    #[error("scores and events can only change while a match is live, at half time or full time (status is {status})")]
    ScoringClosed { status: MatchStatus },
    /// Lifecycle transition not allowed.
    #[error("cannot move a match from {from} to {to}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },
    /// No event with the given id on this fixture.
    #[error("event {id} not found")]
    EventNotFound { id: MatchEventId },
}

impl From<MatchRuleError> for Error {
    fn from(err: MatchRuleError) -> Self {
        match &err {
            MatchRuleError::ScoringClosed { status } => Error::invalid_request(err.to_string())
                .with_details(serde_json::json!({ "status": status })),
            MatchRuleError::InvalidTransition { from, to } => {
                Error::invalid_request(err.to_string())
                    .with_details(serde_json::json!({ "from": from, "to": to }))
            }
            MatchRuleError::EventNotFound { .. } => Error::not_found(err.to_string()),
        }
    }
}

/// Editable fixture details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetails {
    pub home_team: String,
    pub away_team: String,
    pub competition: String,
    pub venue: String,
    pub state: String,
    pub kickoff: DateTime<Utc>,
}

impl MatchDetails {
    /// Validate a complete set of details.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use pitchside::domain::MatchDetails;
    ///
    /// let details = MatchDetails::try_new(
    ///     "Enyimba", "Rangers", None, "Aba Township Stadium", "abia", Utc::now(),
    /// )
    /// .expect("valid details");
    /// assert_eq!(details.competition, "NPFL");
    /// assert_eq!(details.state, "Abia");
    /// ```
    pub fn try_new(
        home_team: &str,
        away_team: &str,
        competition_name: Option<&str>,
        venue: &str,
        state: &str,
        kickoff: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let details = Self {
            home_team: bounded_text("homeTeam", home_team, TEAM_MIN, TEAM_MAX)?,
            away_team: bounded_text("awayTeam", away_team, TEAM_MIN, TEAM_MAX)?,
            competition: competition(competition_name)?,
            venue: bounded_text("venue", venue, VENUE_MIN, VENUE_MAX)?,
            state: nigerian_state("state", state)?,
            kickoff,
        };
        details.check_distinct_teams()?;
        Ok(details)
    }

    fn check_distinct_teams(&self) -> Result<(), ValidationError> {
        if self.home_team.to_lowercase() == self.away_team.to_lowercase() {
            return Err(ValidationError::invalid(
                "awayTeam",
                "must differ from homeTeam",
            ));
        }
        Ok(())
    }
}

/// Partial details update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDetailsPatch {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub competition: Option<String>,
    pub venue: Option<String>,
    pub state: Option<String>,
    pub kickoff: Option<DateTime<Utc>>,
}

impl MatchDetailsPatch {
    /// Merge onto the current details and re-validate the result.
    pub fn merge(&self, current: &Match) -> Result<MatchDetails, ValidationError> {
        MatchDetails::try_new(
            self.home_team.as_deref().unwrap_or(&current.home_team),
            self.away_team.as_deref().unwrap_or(&current.away_team),
            Some(
                self.competition
                    .as_deref()
                    .unwrap_or(&current.competition),
            ),
            self.venue.as_deref().unwrap_or(&current.venue),
            self.state.as_deref().unwrap_or(&current.state),
            self.kickoff.unwrap_or(current.kickoff),
        )
    }
}

impl Match {
    /// New scheduled fixture with a 0-0 score.
    pub fn new(id: MatchId, details: MatchDetails, now: DateTime<Utc>) -> Self {
        Self {
            id,
            home_team: details.home_team,
            away_team: details.away_team,
            competition: details.competition,
            venue: details.venue,
            state: details.state,
            kickoff: details.kickoff,
            status: MatchStatus::Scheduled,
            minute: None,
            home_score: 0,
            away_score: 0,
            events: Vec::new(),
            lineups: None,
            stats: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable details.
    pub fn apply_details(&mut self, details: MatchDetails, now: DateTime<Utc>) {
        self.home_team = details.home_team;
        self.away_team = details.away_team;
        self.competition = details.competition;
        self.venue = details.venue;
        self.state = details.state;
        self.kickoff = details.kickoff;
        self.updated_at = now;
    }

    /// Set both scores explicitly.
    pub fn set_score(
        &mut self,
        home: u32,
        away: u32,
        now: DateTime<Utc>,
    ) -> Result<(), MatchRuleError> {
        self.ensure_scoring_open()?;
        self.home_score = home;
        self.away_score = away;
        self.updated_at = now;
        Ok(())
    }

    /// Move to `next`, optionally updating the match clock.
    ///
    /// Re-stating the current status only updates the minute. Terminal and
    /// pre-kick-off states clear the clock unless a minute is supplied.
    pub fn change_status(
        &mut self,
        next: MatchStatus,
        minute: Option<u16>,
        now: DateTime<Utc>,
    ) -> Result<(), MatchRuleError> {
        if next != self.status && !self.status.can_transition_to(next) {
            return Err(MatchRuleError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        let clock = match (next, minute) {
            (_, Some(minute)) => Some(minute),
            (MatchStatus::Live | MatchStatus::HalfTime | MatchStatus::FullTime, None) => {
                self.minute
            }
            (MatchStatus::Scheduled | MatchStatus::Postponed | MatchStatus::Cancelled, None) => {
                None
            }
        };
        self.status = next;
        self.minute = clock;
        self.updated_at = now;
        Ok(())
    }

    /// Record an event, crediting goals to the scoring side.
    pub fn add_event(
        &mut self,
        event: MatchEvent,
        now: DateTime<Utc>,
    ) -> Result<&MatchEvent, MatchRuleError> {
        self.ensure_scoring_open()?;
        if let Some(side) = event.event_type.scoring_side(event.team) {
            *self.score_mut(side) += 1;
        }
        let id = event.id;
        self.events.push(event);
        self.events
            .sort_by(|a, b| (a.minute, a.created_at).cmp(&(b.minute, b.created_at)));
        self.updated_at = now;
        self.events
            .iter()
            .find(|stored| stored.id == id)
            .ok_or(MatchRuleError::EventNotFound { id })
    }

    /// Remove an event, reversing its score adjustment without going below zero.
    pub fn remove_event(
        &mut self,
        id: MatchEventId,
        now: DateTime<Utc>,
    ) -> Result<MatchEvent, MatchRuleError> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or(MatchRuleError::EventNotFound { id })?;
        self.ensure_scoring_open()?;
        let removed = self.events.remove(index);
        if let Some(side) = removed.event_type.scoring_side(removed.team) {
            let score = self.score_mut(side);
            *score = score.saturating_sub(1);
        }
        self.updated_at = now;
        Ok(removed)
    }

    /// Replace both team sheets.
    pub fn set_lineups(&mut self, lineups: Lineups, now: DateTime<Utc>) {
        self.lineups = Some(lineups);
        self.updated_at = now;
    }

    /// Replace the statistics.
    pub fn set_stats(&mut self, stats: MatchStats, now: DateTime<Utc>) {
        self.stats = Some(stats);
        self.updated_at = now;
    }

    fn ensure_scoring_open(&self) -> Result<(), MatchRuleError> {
        if self.status.accepts_score_changes() {
            Ok(())
        } else {
            Err(MatchRuleError::ScoringClosed {
                status: self.status,
            })
        }
    }

    fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Home => &mut self.home_score,
            Side::Away => &mut self.away_score,
        }
    }
}

/// Filters accepted by the fixture list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub competition: Option<String>,
    pub state: Option<String>,
    /// Case-insensitive substring matched against either side.
    pub team: Option<String>,
    /// Restrict to fixtures currently in play.
    pub in_play_only: bool,
}

impl MatchFilter {
    /// Filter for the live fixtures view.
    pub fn in_play() -> Self {
        Self {
            in_play_only: true,
            ..Self::default()
        }
    }

    /// Whether `fixture` passes the filter.
    pub fn accepts(&self, fixture: &Match) -> bool {
        let status_ok = self.status.is_none_or(|status| fixture.status == status)
            && (!self.in_play_only || fixture.status.is_in_play());
        let competition_ok = self
            .competition
            .as_deref()
            .is_none_or(|c| fixture.competition.eq_ignore_ascii_case(c));
        let state_ok = self
            .state
            .as_deref()
            .is_none_or(|s| fixture.state.eq_ignore_ascii_case(s));
        let team_ok = self.team.as_deref().is_none_or(|team| {
            let needle = team.to_lowercase();
            fixture.home_team.to_lowercase().contains(&needle)
                || fixture.away_team.to_lowercase().contains(&needle)
        });
        status_ok && competition_ok && state_ok && team_ok
    }
}
