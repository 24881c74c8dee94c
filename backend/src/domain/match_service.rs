//! Fixture service implementing [`MatchQuery`] and [`MatchCommand`].
//!
//! Every successful write is followed by a [`MatchUpdate`] handed to the
//! [`MatchUpdatePublisher`]; a failed write publishes nothing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{MAX_LIMIT, Page, PageRequest};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    MatchCommand, MatchPersistenceError, MatchQuery, MatchRepository, MatchUpdatePublisher,
};
use crate::domain::revision::{WRITE_ATTEMPTS, next_stamp};
use crate::domain::{
    Error, Lineups, Match, MatchDetails, MatchDetailsPatch, MatchEventId, MatchFilter, MatchId,
    MatchStats, MatchStatus, MatchUpdate, MatchUpdateKind, NewMatchEvent,
};

/// Fixture use-cases backed by a [`MatchRepository`].
#[derive(Clone)]
pub struct MatchService<R> {
    repo: Arc<R>,
    publisher: Arc<dyn MatchUpdatePublisher>,
    clock: Arc<dyn Clock>,
}

impl<R> MatchService<R> {
    /// Create the service.
    pub fn new(
        repo: Arc<R>,
        publisher: Arc<dyn MatchUpdatePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            publisher,
            clock,
        }
    }
}

fn map_match_error(err: MatchPersistenceError) -> Error {
    match err {
        MatchPersistenceError::Connection { message } => {
            warn!(%message, "match repository unavailable");
            Error::service_unavailable("match store is unavailable")
        }
        MatchPersistenceError::Query { message } => {
            Error::internal(format!("match repository query failed: {message}"))
        }
        MatchPersistenceError::Stale { id } => {
            Error::conflict(format!("match {id} is being updated concurrently; retry"))
        }
    }
}

fn match_not_found() -> Error {
    Error::not_found("match not found")
}

impl<R> MatchService<R>
where
    R: MatchRepository,
{
    async fn load(&self, id: MatchId) -> Result<Match, Error> {
        self.repo
            .find_by_id(&id)
            .await
            .map_err(map_match_error)?
            .ok_or_else(match_not_found)
    }

    fn announce(&self, kind: MatchUpdateKind, fixture: Match) {
        let match_id = fixture.id;
        let receivers = self
            .publisher
            .publish(MatchUpdate::new(kind, fixture, self.clock.utc()));
        debug!(%match_id, ?kind, receivers, "match update published");
    }

    /// Load, mutate through `apply`, write back and announce as `kind`.
    ///
    /// A write that loses the race to another one is replayed on the fresh
    /// fixture, so every change lands exactly once.
    async fn modify<F>(&self, id: MatchId, kind: MatchUpdateKind, apply: F) -> Result<Match, Error>
    where
        F: Fn(&mut Match, DateTime<Utc>) -> Result<(), Error> + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let mut fixture = self.load(id).await?;
            let read_at = fixture.updated_at;
            apply(&mut fixture, next_stamp(read_at, self.clock.utc()))?;
            match self.repo.update(&fixture, read_at).await {
                Ok(true) => {
                    self.announce(kind, fixture.clone());
                    return Ok(fixture);
                }
                Ok(false) => return Err(match_not_found()),
                Err(MatchPersistenceError::Stale { .. }) if attempt < WRITE_ATTEMPTS => {
                    debug!(match_id = %id, attempt, "match changed underneath; replaying");
                    attempt += 1;
                }
                Err(err) => return Err(map_match_error(err)),
            }
        }
    }
}

#[async_trait]
impl<R> MatchQuery for MatchService<R>
where
    R: MatchRepository,
{
    async fn list(&self, filter: MatchFilter, page: PageRequest) -> Result<Page<Match>, Error> {
        self.repo
            .list(&filter, page)
            .await
            .map_err(map_match_error)
    }

    async fn live(&self) -> Result<Vec<Match>, Error> {
        let page = PageRequest::try_new(Some(1), Some(MAX_LIMIT))
            .map_err(|err| Error::internal(err.to_string()))?;
        let fixtures = self
            .repo
            .list(&MatchFilter::in_play(), page)
            .await
            .map_err(map_match_error)?;
        Ok(fixtures.data)
    }

    async fn find(&self, id: MatchId) -> Result<Match, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<R> MatchCommand for MatchService<R>
where
    R: MatchRepository,
{
    async fn create(&self, details: MatchDetails) -> Result<Match, Error> {
        let fixture = Match::new(MatchId::random(), details, self.clock.utc());
        self.repo.insert(&fixture).await.map_err(map_match_error)?;
        info!(
            match_id = %fixture.id,
            home = %fixture.home_team,
            away = %fixture.away_team,
            "match created"
        );
        self.announce(MatchUpdateKind::Created, fixture.clone());
        Ok(fixture)
    }

    async fn update_details(&self, id: MatchId, patch: MatchDetailsPatch) -> Result<Match, Error> {
        self.modify(id, MatchUpdateKind::Updated, |fixture, now| {
            let details = patch.merge(fixture)?;
            fixture.apply_details(details, now);
            Ok(())
        })
        .await
    }

    async fn set_score(&self, id: MatchId, home: u32, away: u32) -> Result<Match, Error> {
        self.modify(id, MatchUpdateKind::ScoreChanged, |fixture, now| {
            Ok(fixture.set_score(home, away, now)?)
        })
        .await
    }

    async fn change_status(
        &self,
        id: MatchId,
        status: MatchStatus,
        minute: Option<u16>,
    ) -> Result<Match, Error> {
        let fixture = self
            .modify(id, MatchUpdateKind::StatusChanged, |fixture, now| {
                Ok(fixture.change_status(status, minute, now)?)
            })
            .await?;
        info!(match_id = %id, status = status.as_str(), minute, "match status changed");
        Ok(fixture)
    }

    async fn add_event(&self, id: MatchId, event: NewMatchEvent) -> Result<Match, Error> {
        self.modify(id, MatchUpdateKind::EventAdded, |fixture, now| {
            fixture.add_event(event.clone().into_event(MatchEventId::random(), now), now)?;
            Ok(())
        })
        .await
    }

    async fn remove_event(&self, id: MatchId, event_id: MatchEventId) -> Result<Match, Error> {
        self.modify(id, MatchUpdateKind::EventRemoved, |fixture, now| {
            fixture.remove_event(event_id, now)?;
            Ok(())
        })
        .await
    }

    async fn set_lineups(&self, id: MatchId, lineups: Lineups) -> Result<Match, Error> {
        self.modify(id, MatchUpdateKind::Updated, |fixture, now| {
            fixture.set_lineups(lineups.clone(), now);
            Ok(())
        })
        .await
    }

    async fn set_stats(&self, id: MatchId, stats: MatchStats) -> Result<Match, Error> {
        self.modify(id, MatchUpdateKind::Updated, |fixture, now| {
            fixture.set_stats(stats, now);
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: MatchId) -> Result<(), Error> {
        let fixture = self.load(id).await?;
        if !self.repo.delete(&id).await.map_err(map_match_error)? {
            return Err(match_not_found());
        }
        info!(match_id = %id, "match deleted");
        self.announce(MatchUpdateKind::Deleted, fixture);
        Ok(())
    }
}

#[cfg(test)]
#[path = "match_service_tests.rs"]
mod tests;
