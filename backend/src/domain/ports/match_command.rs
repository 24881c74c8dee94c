//! Driving ports for fixture reads and staff writes.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, Lineups, Match, MatchDetails, MatchDetailsPatch, MatchEventId, MatchFilter, MatchId,
    MatchStats, MatchStatus, NewMatchEvent,
};

/// Public fixture queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchQuery: Send + Sync {
    /// Paginated fixtures ordered by kick-off.
    async fn list(&self, filter: MatchFilter, page: PageRequest) -> Result<Page<Match>, Error>;

    /// Fixtures currently live or at half time.
    async fn live(&self) -> Result<Vec<Match>, Error>;

    /// One fixture.
    async fn find(&self, id: MatchId) -> Result<Match, Error>;
}

/// Staff fixture writes. Every successful write publishes a match update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchCommand: Send + Sync {
    /// Create a scheduled fixture.
    async fn create(&self, details: MatchDetails) -> Result<Match, Error>;

    /// Merge and re-validate fixture details.
    async fn update_details(&self, id: MatchId, patch: MatchDetailsPatch) -> Result<Match, Error>;

    /// Overwrite both scores.
    async fn set_score(&self, id: MatchId, home: u32, away: u32) -> Result<Match, Error>;

    /// Move the fixture through its lifecycle.
    async fn change_status(
        &self,
        id: MatchId,
        status: MatchStatus,
        minute: Option<u16>,
    ) -> Result<Match, Error>;

    /// Record an event and adjust the score.
    async fn add_event(&self, id: MatchId, event: NewMatchEvent) -> Result<Match, Error>;

    /// Remove an event and reverse its score adjustment.
    async fn remove_event(&self, id: MatchId, event_id: MatchEventId) -> Result<Match, Error>;

    /// Replace both team sheets.
    async fn set_lineups(&self, id: MatchId, lineups: Lineups) -> Result<Match, Error>;

    /// Replace match statistics.
    async fn set_stats(&self, id: MatchId, stats: MatchStats) -> Result<Match, Error>;

    /// Delete the fixture.
    async fn delete(&self, id: MatchId) -> Result<(), Error>;
}
