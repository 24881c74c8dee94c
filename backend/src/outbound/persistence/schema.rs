//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a migration
//! changes the schema, update this file to match (`diesel print-schema` can
//! generate it from a live database).

diesel::table! {
    /// Fan accounts.
    users (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Lower-cased; unique via `users_email_key`.
        email -> Varchar,
        password_hash -> Text,
        avatar_url -> Nullable<Text>,
        favourite_teams -> Array<Text>,
        followed_states -> Array<Text>,
        /// SHA-256 hex digest of the pending reset token.
        reset_token_hash -> Nullable<Varchar>,
        reset_token_expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Staff accounts.
    admins (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// `admin` or `super_admin`.
        role -> Varchar,
        reset_token_hash -> Nullable<Varchar>,
        reset_token_expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Fixtures with embedded events, team sheets and statistics.
    matches (id) {
        id -> Uuid,
        home_team -> Varchar,
        away_team -> Varchar,
        competition -> Varchar,
        venue -> Varchar,
        state -> Varchar,
        kickoff -> Timestamptz,
        status -> Varchar,
        minute -> Nullable<Int4>,
        home_score -> Int4,
        away_score -> Int4,
        /// JSON array of match events sorted by minute.
        events -> Jsonb,
        lineups -> Nullable<Jsonb>,
        stats -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Articles with embedded comments and likes.
    news (id) {
        id -> Uuid,
        title -> Varchar,
        /// Unique via `news_slug_key`.
        slug -> Varchar,
        summary -> Nullable<Varchar>,
        content -> Text,
        category -> Varchar,
        tags -> Array<Text>,
        image_url -> Nullable<Text>,
        status -> Varchar,
        published_at -> Nullable<Timestamptz>,
        author_id -> Uuid,
        views -> Int8,
        likes -> Array<Uuid>,
        comments -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(admins, matches, news, users);
