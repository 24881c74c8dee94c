//! Port abstraction for fixture persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Match, MatchFilter, MatchId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by match repository adapters.
    pub enum MatchPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "match repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "match repository query failed: {message}",
        /// The fixture was written by someone else since it was read.
        Stale { id: String } => "match {id} changed since it was read",
    }
}

/// Port for storing fixtures with their embedded events and sheets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Insert a new fixture.
    async fn insert(&self, fixture: &Match) -> Result<(), MatchPersistenceError>;

    /// Replace a stored fixture whose `updated_at` is still `read_at`.
    ///
    /// Returns `false` when the fixture no longer exists and
    /// [`MatchPersistenceError::Stale`] when another write got there first.
    async fn update(
        &self,
        fixture: &Match,
        read_at: DateTime<Utc>,
    ) -> Result<bool, MatchPersistenceError>;

    /// Fetch a fixture by identifier.
    async fn find_by_id(&self, id: &MatchId) -> Result<Option<Match>, MatchPersistenceError>;

    /// Delete a fixture; returns `false` when nothing was deleted.
    async fn delete(&self, id: &MatchId) -> Result<bool, MatchPersistenceError>;

    /// List fixtures passing `filter`, ordered by kick-off ascending.
    async fn list(
        &self,
        filter: &MatchFilter,
        page: PageRequest,
    ) -> Result<Page<Match>, MatchPersistenceError>;
}
