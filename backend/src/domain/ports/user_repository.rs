//! Port abstraction for fan account persistence adapters and their errors.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the e-mail address.
        DuplicateEmail { email: String } => "e-mail {email} is already registered",
    }
}

/// Port for storing fan accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Replace an existing account; returns `false` when it no longer exists.
    async fn update(&self, account: &UserAccount) -> Result<bool, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account by its lower-cased e-mail.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch the account holding a pending reset with this token digest.
    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Delete an account; returns `false` when nothing was deleted.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// List profiles, newest first, optionally matching `search` against
    /// names and e-mail.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, UserPersistenceError>;
}
