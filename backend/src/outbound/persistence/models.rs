//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Rows are converted to domain aggregates in
//! the repository modules, where stored strings are re-validated.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{admins, matches, news, users};

// ---------------------------------------------------------------------------
// Fan accounts
// ---------------------------------------------------------------------------

/// Row struct for the users table; also used for inserts and full updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub favourite_teams: Vec<String>,
    pub followed_states: Vec<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Staff accounts
// ---------------------------------------------------------------------------

/// Row struct for the admins table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AdminRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Row struct for the matches table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MatchRow {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub competition: String,
    pub venue: String,
    pub state: String,
    pub kickoff: DateTime<Utc>,
    pub status: String,
    pub minute: Option<i32>,
    pub home_score: i32,
    pub away_score: i32,
    pub events: serde_json::Value,
    pub lineups: Option<serde_json::Value>,
    pub stats: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

/// Row struct for the news table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewsRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub views: i64,
    pub likes: Vec<Uuid>,
    pub comments: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editorial columns of a news row; views, likes and comments are left out.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewsEditRow {
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Result of toggling a like in place.
#[derive(Debug, QueryableByName)]
pub(crate) struct LikeToggleRow {
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub liked: bool,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub likes: i64,
}
