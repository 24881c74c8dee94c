//! In-memory fixture store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{MatchPersistenceError, MatchRepository};
use crate::domain::{Match, MatchFilter, MatchId};

use super::{paginate, read, write};

/// [`MatchRepository`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryMatchRepository {
    fixtures: RwLock<HashMap<MatchId, Match>>,
}

impl MemoryMatchRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchRepository for MemoryMatchRepository {
    async fn insert(&self, fixture: &Match) -> Result<(), MatchPersistenceError> {
        let mut fixtures = write(&self.fixtures);
        if fixtures.contains_key(&fixture.id) {
            return Err(MatchPersistenceError::query(format!(
                "match {} already exists",
                fixture.id
            )));
        }
        fixtures.insert(fixture.id, fixture.clone());
        Ok(())
    }

    async fn update(
        &self,
        fixture: &Match,
        read_at: DateTime<Utc>,
    ) -> Result<bool, MatchPersistenceError> {
        let mut fixtures = write(&self.fixtures);
        match fixtures.get_mut(&fixture.id) {
            Some(stored) if stored.updated_at != read_at => {
                Err(MatchPersistenceError::stale(fixture.id.to_string()))
            }
            Some(stored) => {
                *stored = fixture.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: &MatchId) -> Result<Option<Match>, MatchPersistenceError> {
        Ok(read(&self.fixtures).get(id).cloned())
    }

    async fn delete(&self, id: &MatchId) -> Result<bool, MatchPersistenceError> {
        Ok(write(&self.fixtures).remove(id).is_some())
    }

    async fn list(
        &self,
        filter: &MatchFilter,
        page: PageRequest,
    ) -> Result<Page<Match>, MatchPersistenceError> {
        let mut fixtures: Vec<Match> = read(&self.fixtures)
            .values()
            .filter(|fixture| filter.accepts(fixture))
            .cloned()
            .collect();
        fixtures.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then(a.id.cmp(&b.id)));
        Ok(paginate(fixtures, page))
    }
}
