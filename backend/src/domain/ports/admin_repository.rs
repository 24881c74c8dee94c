//! Port abstraction for staff account persistence adapters and their errors.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Admin, AdminAccount, AdminId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by admin repository adapters.
    pub enum AdminPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "admin repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "admin repository query failed: {message}",
        /// Another account already uses the e-mail address.
        DuplicateEmail { email: String } => "e-mail {email} is already registered",
    }
}

/// Port for storing staff accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Number of staff accounts.
    async fn count(&self) -> Result<u64, AdminPersistenceError>;

    /// Insert a new account.
    async fn insert(&self, account: &AdminAccount) -> Result<(), AdminPersistenceError>;

    /// Insert the bootstrap account only while no staff account exists.
    ///
    /// Returns `false`, storing nothing, when another account is already
    /// present. The check and the insert happen atomically.
    async fn insert_first(&self, account: &AdminAccount) -> Result<bool, AdminPersistenceError>;

    /// Replace an existing account; returns `false` when it no longer exists.
    async fn update(&self, account: &AdminAccount) -> Result<bool, AdminPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AdminId)
    -> Result<Option<AdminAccount>, AdminPersistenceError>;

    /// Fetch an account by its lower-cased e-mail.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError>;

    /// Fetch the account holding a pending reset with this token digest.
    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError>;

    /// Delete an account; returns `false` when nothing was deleted.
    async fn delete(&self, id: &AdminId) -> Result<bool, AdminPersistenceError>;

    /// List profiles, oldest first.
    async fn list(&self, page: PageRequest) -> Result<Page<Admin>, AdminPersistenceError>;
}
