//! PostgreSQL-backed `MatchRepository` implementation using Diesel ORM.
//!
//! Events, team sheets and statistics are embedded JSONB documents; the
//! aggregate is always written as a whole, guarded by the `updated_at` value
//! it was read with.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{MatchPersistenceError, MatchRepository};
use crate::domain::{Match, MatchFilter, MatchId, MatchStatus};

use super::diesel_basic_error_mapping::{DbFailure, classify, pool_message};
use super::diesel_helpers::{
    from_json, like_contains, like_exact, page_window, to_json, total_count,
};
use super::models::MatchRow;
use super::pool::{DbPool, PoolError};
use super::schema::matches;

/// Diesel-backed implementation of the [`MatchRepository`] port.
#[derive(Clone)]
pub struct DieselMatchRepository {
    pool: DbPool,
}

impl DieselMatchRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MatchPersistenceError {
    MatchPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> MatchPersistenceError {
    match classify(error) {
        DbFailure::Connection(message) => MatchPersistenceError::connection(message),
        DbFailure::Query(message) => MatchPersistenceError::query(message),
        DbFailure::Unique { constraint } => MatchPersistenceError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("matches")
        )),
    }
}

fn int_column(value: u32, column: &str) -> Result<i32, MatchPersistenceError> {
    i32::try_from(value)
        .map_err(|_| MatchPersistenceError::query(format!("{column} {value} is out of range")))
}

fn match_to_row(fixture: &Match) -> Result<MatchRow, MatchPersistenceError> {
    let lineups = fixture
        .lineups
        .as_ref()
        .map(|lineups| to_json(lineups, "lineups"))
        .transpose()
        .map_err(MatchPersistenceError::query)?;
    let stats = fixture
        .stats
        .as_ref()
        .map(|stats| to_json(stats, "stats"))
        .transpose()
        .map_err(MatchPersistenceError::query)?;
    Ok(MatchRow {
        id: *fixture.id.as_uuid(),
        home_team: fixture.home_team.clone(),
        away_team: fixture.away_team.clone(),
        competition: fixture.competition.clone(),
        venue: fixture.venue.clone(),
        state: fixture.state.clone(),
        kickoff: fixture.kickoff,
        status: fixture.status.as_str().to_owned(),
        minute: fixture.minute.map(i32::from),
        home_score: int_column(fixture.home_score, "home_score")?,
        away_score: int_column(fixture.away_score, "away_score")?,
        events: to_json(&fixture.events, "events").map_err(MatchPersistenceError::query)?,
        lineups,
        stats,
        created_at: fixture.created_at,
        updated_at: fixture.updated_at,
    })
}

fn row_to_match(row: MatchRow) -> Result<Match, MatchPersistenceError> {
    let corrupt = |column: &str| {
        let column = column.to_owned();
        move |_| MatchPersistenceError::query(format!("stored match {column} is out of range"))
    };
    Ok(Match {
        id: MatchId::from_uuid(row.id),
        home_team: row.home_team,
        away_team: row.away_team,
        competition: row.competition,
        venue: row.venue,
        state: row.state,
        kickoff: row.kickoff,
        status: MatchStatus::parse(&row.status)
            .map_err(|err| MatchPersistenceError::query(format!("stored match status: {err}")))?,
        minute: row
            .minute
            .map(u16::try_from)
            .transpose()
            .map_err(corrupt("minute"))?,
        home_score: u32::try_from(row.home_score).map_err(corrupt("home_score"))?,
        away_score: u32::try_from(row.away_score).map_err(corrupt("away_score"))?,
        events: from_json(row.events, "events").map_err(MatchPersistenceError::query)?,
        lineups: row
            .lineups
            .map(|value| from_json(value, "lineups"))
            .transpose()
            .map_err(MatchPersistenceError::query)?,
        stats: row
            .stats
            .map(|value| from_json(value, "stats"))
            .transpose()
            .map_err(MatchPersistenceError::query)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn in_play_statuses() -> Vec<&'static str> {
    MatchStatus::ALL
        .into_iter()
        .filter(|status| status.is_in_play())
        .map(MatchStatus::as_str)
        .collect()
}

fn filtered(filter: &MatchFilter) -> matches::BoxedQuery<'static, Pg> {
    let mut query = matches::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(matches::status.eq(status.as_str()));
    }
    if filter.in_play_only {
        query = query.filter(matches::status.eq_any(in_play_statuses()));
    }
    if let Some(competition) = filter.competition.as_deref() {
        query = query.filter(matches::competition.ilike(like_exact(competition)));
    }
    if let Some(state) = filter.state.as_deref() {
        query = query.filter(matches::state.ilike(like_exact(state)));
    }
    if let Some(team) = filter.team.as_deref() {
        let pattern = like_contains(team);
        query = query.filter(
            matches::home_team
                .ilike(pattern.clone())
                .or(matches::away_team.ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl MatchRepository for DieselMatchRepository {
    async fn insert(&self, fixture: &Match) -> Result<(), MatchPersistenceError> {
        let row = match_to_row(fixture)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(matches::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        fixture: &Match,
        read_at: DateTime<Utc>,
    ) -> Result<bool, MatchPersistenceError> {
        let row = match_to_row(fixture)?;
        let id = fixture.id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            matches::table
                .find(id)
                .filter(matches::updated_at.eq(read_at)),
        )
        .set(&row)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(true);
        }
        let exists: bool = diesel::select(exists(matches::table.find(id)))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if exists {
            Err(MatchPersistenceError::stale(fixture.id.to_string()))
        } else {
            Ok(false)
        }
    }

    async fn find_by_id(&self, id: &MatchId) -> Result<Option<Match>, MatchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MatchRow> = matches::table
            .find(id.as_uuid())
            .select(MatchRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_match).transpose()
    }

    async fn delete(&self, id: &MatchId) -> Result<bool, MatchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(matches::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(
        &self,
        filter: &MatchFilter,
        page: PageRequest,
    ) -> Result<Page<Match>, MatchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<MatchRow> = filtered(filter)
            .order((matches::kickoff.asc(), matches::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(MatchRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let fixtures = rows
            .into_iter()
            .map(row_to_match)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(fixtures, page, total_count(total)))
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; queries are exercised against PostgreSQL only.
    use super::*;
    use rstest::rstest;

    use crate::domain::{EventType, MatchDetails, MatchEventId, NewMatchEvent, Side};

    fn fixture() -> Match {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        let details = MatchDetails::try_new(
            "Rivers United",
            "Remo Stars",
            None,
            "Adokiye Amiesimaka Stadium",
            "Rivers",
            now,
        )
        .expect("valid details");
        let mut fixture = Match::new(MatchId::random(), details, now);
        fixture
            .change_status(MatchStatus::Live, Some(30), now)
            .expect("kick off");
        let goal = NewMatchEvent::try_new(EventType::Goal, Side::Away, "Sikiru Alimi", 29, None, None)
            .expect("valid event")
            .into_event(MatchEventId::random(), now);
        fixture.add_event(goal, now).expect("goal");
        fixture
    }

    #[rstest]
    fn rows_convert_back_to_the_same_fixture() {
        let original = fixture();
        let row = match_to_row(&original).expect("encodable");
        assert_eq!(row.status, "live");
        assert_eq!(row.away_score, 1);
        assert_eq!(row_to_match(row).expect("decodable"), original);
    }

    #[rstest]
    fn negative_scores_are_rejected() {
        let mut row = match_to_row(&fixture()).expect("encodable");
        row.home_score = -1;
        assert!(matches!(
            row_to_match(row),
            Err(MatchPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn in_play_statuses_cover_live_and_half_time() {
        assert_eq!(in_play_statuses(), vec!["live", "half_time"]);
    }
}
