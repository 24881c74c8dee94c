//! Driving port for fan account use-cases.
//!
//! HTTP handlers call this port; the backing service owns hashing, tokens,
//! reset mail and avatar uploads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, IssuedToken, LoginCredentials, Password, ProfileUpdate, ResetToken, User, UserId,
    UserRegistration,
};

use super::ImageUpload;

/// Token and profile returned after registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub token: IssuedToken,
    pub user: User,
}

/// Domain use-case port for fan accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Create an account and sign the caller in.
    async fn register(&self, registration: UserRegistration) -> Result<UserSession, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<UserSession, Error>;

    /// Profile of the signed-in fan.
    async fn profile(&self, id: UserId) -> Result<User, Error>;

    /// Apply a partial profile update.
    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Upload and attach a new avatar.
    async fn update_avatar(&self, id: UserId, image: ImageUpload) -> Result<User, Error>;

    /// Replace the password after checking the current one.
    async fn change_password(
        &self,
        id: UserId,
        current: String,
        new_password: Password,
    ) -> Result<(), Error>;

    /// Mail a reset link when the e-mail belongs to an account.
    async fn forgot_password(&self, email: String) -> Result<(), Error>;

    /// Consume a reset token and set a new password.
    async fn reset_password(&self, token: ResetToken, new_password: Password) -> Result<(), Error>;

    /// Delete the signed-in fan's account.
    async fn delete_account(&self, id: UserId) -> Result<(), Error>;

    /// Staff listing of fan profiles.
    async fn list_users(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, Error>;

    /// Staff lookup of one fan profile.
    async fn find_user(&self, id: UserId) -> Result<User, Error>;

    /// Staff deletion of a fan account.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
