//! PostgreSQL-backed `AdminRepository` implementation using Diesel ORM.
//!
//! The bootstrap insert locks the `admins` table for the length of its
//! transaction so two first registrations cannot both succeed.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{AdminPersistenceError, AdminRepository};
use crate::domain::{
    Admin, AdminAccount, AdminId, AdminRole, Credentials, Email, PasswordHash, ResetTicket,
};

use super::diesel_basic_error_mapping::{DbFailure, classify, is_unique_violation, pool_message};
use super::diesel_helpers::{page_window, total_count};
use super::models::AdminRow;
use super::pool::{DbPool, PoolError};
use super::schema::admins;

const EMAIL_CONSTRAINT: &str = "admins_email_key";

/// Diesel-backed implementation of the [`AdminRepository`] port.
#[derive(Clone)]
pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminPersistenceError {
    AdminPersistenceError::connection(pool_message(error))
}

fn map_failure(failure: DbFailure) -> AdminPersistenceError {
    match failure {
        DbFailure::Connection(message) => AdminPersistenceError::connection(message),
        DbFailure::Query(message) => AdminPersistenceError::query(message),
        DbFailure::Unique { constraint } => AdminPersistenceError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("admins")
        )),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AdminPersistenceError {
    map_failure(classify(error))
}

fn map_write_error(error: diesel::result::Error, email: &Email) -> AdminPersistenceError {
    let failure = classify(error);
    if is_unique_violation(&failure, EMAIL_CONSTRAINT) {
        AdminPersistenceError::duplicate_email(email.as_str())
    } else {
        map_failure(failure)
    }
}

fn account_to_row(account: &AdminAccount) -> AdminRow {
    let admin = &account.admin;
    let reset = account.credentials.reset.as_ref();
    AdminRow {
        id: *admin.id.as_uuid(),
        name: admin.name.clone(),
        email: admin.email.as_str().to_owned(),
        password_hash: account.credentials.password_hash.as_str().to_owned(),
        role: admin.role.as_str().to_owned(),
        reset_token_hash: reset.map(|ticket| ticket.token_hash.clone()),
        reset_token_expires_at: reset.map(|ticket| ticket.expires_at),
        created_at: admin.created_at,
        updated_at: admin.updated_at,
    }
}

fn row_to_account(row: AdminRow) -> Result<AdminAccount, AdminPersistenceError> {
    let email = Email::parse(&row.email)
        .map_err(|err| AdminPersistenceError::query(format!("stored admin e-mail: {err}")))?;
    let role = AdminRole::parse(&row.role)
        .map_err(|err| AdminPersistenceError::query(format!("stored admin role: {err}")))?;
    let reset = match (row.reset_token_hash, row.reset_token_expires_at) {
        (Some(token_hash), Some(expires_at)) => Some(ResetTicket {
            token_hash,
            expires_at,
        }),
        _ => None,
    };
    Ok(AdminAccount {
        admin: Admin {
            id: AdminId::from_uuid(row.id),
            name: row.name,
            email,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        credentials: Credentials {
            password_hash: PasswordHash::new(row.password_hash),
            reset,
        },
    })
}

impl DieselAdminRepository {
    async fn find_one(
        &self,
        query: admins::BoxedQuery<'static, Pg>,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AdminRow> = query
            .select(AdminRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }
}

#[async_trait]
impl AdminRepository for DieselAdminRepository {
    async fn count(&self) -> Result<u64, AdminPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = admins::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(total_count(total))
    }

    async fn insert(&self, account: &AdminAccount) -> Result<(), AdminPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(admins::table)
            .values(&account_to_row(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &account.admin.email))
    }

    async fn insert_first(&self, account: &AdminAccount) -> Result<bool, AdminPersistenceError> {
        let row = account_to_row(account);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            let row = &row;
            async move {
                diesel::sql_query("LOCK TABLE admins IN SHARE ROW EXCLUSIVE MODE")
                    .execute(conn)
                    .await?;
                let existing: i64 = admins::table.count().get_result(conn).await?;
                if existing > 0 {
                    return Ok(false);
                }
                diesel::insert_into(admins::table)
                    .values(row)
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, &account.admin.email))
    }

    async fn update(&self, account: &AdminAccount) -> Result<bool, AdminPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(admins::table.find(account.admin.id.as_uuid()))
            .set(&account_to_row(account))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &account.admin.email))?;
        Ok(updated > 0)
    }

    async fn find_by_id(
        &self,
        id: &AdminId,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
        self.find_one(admins::table.filter(admins::id.eq(*id.as_uuid())).into_boxed())
            .await
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
        let email = email.trim().to_lowercase();
        self.find_one(admins::table.filter(admins::email.eq(email)).into_boxed())
            .await
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
        let token_hash = token_hash.to_owned();
        self.find_one(
            admins::table
                .filter(admins::reset_token_hash.eq(token_hash))
                .into_boxed(),
        )
        .await
    }

    async fn delete(&self, id: &AdminId) -> Result<bool, AdminPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(admins::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Admin>, AdminPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = admins::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(page);
        let rows: Vec<AdminRow> = admins::table
            .order((admins::created_at.asc(), admins::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(AdminRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let admins = rows
            .into_iter()
            .map(|row| row_to_account(row).map(|account| account.admin))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(admins, page, total_count(total)))
    }
}
