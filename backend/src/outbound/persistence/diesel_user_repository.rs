//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Credentials, Email, PasswordHash, ResetTicket, User, UserAccount, UserId,
};

use super::diesel_basic_error_mapping::{DbFailure, classify, is_unique_violation, pool_message};
use super::diesel_helpers::{like_contains, page_window, total_count};
use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_message(error))
}

fn map_failure(failure: DbFailure) -> UserPersistenceError {
    match failure {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::Query(message) => UserPersistenceError::query(message),
        DbFailure::Unique { constraint } => UserPersistenceError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("users")
        )),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_failure(classify(error))
}

/// Map write failures, recognising duplicate e-mail addresses.
fn map_write_error(error: diesel::result::Error, email: &Email) -> UserPersistenceError {
    let failure = classify(error);
    if is_unique_violation(&failure, EMAIL_CONSTRAINT) {
        UserPersistenceError::duplicate_email(email.as_str())
    } else {
        map_failure(failure)
    }
}

fn account_to_row(account: &UserAccount) -> UserRow {
    let user = &account.user;
    let reset = account.credentials.reset.as_ref();
    UserRow {
        id: *user.id.as_uuid(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.as_str().to_owned(),
        password_hash: account.credentials.password_hash.as_str().to_owned(),
        avatar_url: user.avatar_url.clone(),
        favourite_teams: user.favourite_teams.clone(),
        followed_states: user.followed_states.clone(),
        reset_token_hash: reset.map(|ticket| ticket.token_hash.clone()),
        reset_token_expires_at: reset.map(|ticket| ticket.expires_at),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let email = Email::parse(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored user e-mail: {err}")))?;
    let reset = match (row.reset_token_hash, row.reset_token_expires_at) {
        (Some(token_hash), Some(expires_at)) => Some(ResetTicket {
            token_hash,
            expires_at,
        }),
        _ => None,
    };
    Ok(UserAccount {
        user: User {
            id: UserId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            avatar_url: row.avatar_url,
            favourite_teams: row.favourite_teams,
            followed_states: row.followed_states,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        credentials: Credentials {
            password_hash: PasswordHash::new(row.password_hash),
            reset,
        },
    })
}

fn searched(search: Option<&str>) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(term) = search {
        let pattern = like_contains(term);
        query = query.filter(
            users::first_name
                .ilike(pattern.clone())
                .or(users::last_name.ilike(pattern.clone()))
                .or(users::email.ilike(pattern)),
        );
    }
    query
}

impl DieselUserRepository {
    async fn find_one(
        &self,
        query: users::BoxedQuery<'static, Pg>,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = query
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&account_to_row(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &account.user.email))
    }

    async fn update(&self, account: &UserAccount) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(account.user.id.as_uuid()))
            .set(&account_to_row(account))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &account.user.email))?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        self.find_one(users::table.filter(users::id.eq(*id.as_uuid())).into_boxed())
            .await
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let email = email.trim().to_lowercase();
        self.find_one(users::table.filter(users::email.eq(email)).into_boxed())
            .await
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let token_hash = token_hash.to_owned();
        self.find_one(
            users::table
                .filter(users::reset_token_hash.eq(token_hash))
                .into_boxed(),
        )
        .await
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = searched(search.as_deref())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<UserRow> = searched(search.as_deref())
            .order((users::created_at.desc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let users = rows
            .into_iter()
            .map(|row| row_to_account(row).map(|account| account.user))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(users, page, total_count(total)))
    }
}
