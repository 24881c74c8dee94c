//! Driving port for staff account use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Admin, AdminId, AdminRegistration, Error, IssuedToken, LoginCredentials, Password, Principal,
    ResetToken,
};

/// Token and profile returned after staff registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: IssuedToken,
    pub admin: Admin,
}

/// Domain use-case port for staff accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminAccounts: Send + Sync {
    /// Register a staff account.
    ///
    /// The very first account needs no `registrar` and becomes a super
    /// admin; afterwards `registrar` must be a super admin.
    async fn register(
        &self,
        registrar: Option<Principal>,
        registration: AdminRegistration,
    ) -> Result<AdminSession, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AdminSession, Error>;

    /// Profile of the signed-in staff member.
    async fn profile(&self, id: AdminId) -> Result<Admin, Error>;

    /// Replace the password after checking the current one.
    async fn change_password(
        &self,
        id: AdminId,
        current: String,
        new_password: Password,
    ) -> Result<(), Error>;

    /// Mail a reset link when the e-mail belongs to a staff account.
    async fn forgot_password(&self, email: String) -> Result<(), Error>;

    /// Consume a reset token and set a new password.
    async fn reset_password(&self, token: ResetToken, new_password: Password) -> Result<(), Error>;

    /// List staff accounts.
    async fn list_admins(&self, page: PageRequest) -> Result<Page<Admin>, Error>;

    /// Delete another staff account.
    async fn delete_admin(&self, actor: AdminId, target: AdminId) -> Result<(), Error>;
}
