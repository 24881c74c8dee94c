//! Fan account service implementing the [`UserAccounts`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ImageStore, ImageUpload, UserAccounts, UserRepository, UserSession,
};
use crate::domain::service_support::{
    INVALID_CREDENTIALS, INVALID_RESET_TOKEN, map_image_error, map_user_error,
};
use crate::domain::{
    AccountServiceDeps, Credentials, Email, Error, LoginCredentials, Password, Principal,
    ProfileUpdate, ResetToken, User, UserAccount, UserId, UserRegistration,
};

const RESET_PATH: &str = "/reset-password";

/// Fan account use-cases backed by a [`UserRepository`].
#[derive(Clone)]
pub struct UserAccountService<R> {
    repo: Arc<R>,
    images: Arc<dyn ImageStore>,
    deps: AccountServiceDeps,
}

impl<R> UserAccountService<R> {
    /// Create the service.
    pub fn new(repo: Arc<R>, images: Arc<dyn ImageStore>, deps: AccountServiceDeps) -> Self {
        Self { repo, images, deps }
    }
}

fn user_not_found() -> Error {
    Error::not_found("user not found")
}

impl<R> UserAccountService<R>
where
    R: UserRepository,
{
    async fn load(&self, id: &UserId) -> Result<UserAccount, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }

    async fn store(&self, account: &UserAccount) -> Result<(), Error> {
        let updated = self.repo.update(account).await.map_err(map_user_error)?;
        if updated {
            Ok(())
        } else {
            Err(user_not_found())
        }
    }

    fn session(&self, user: User) -> Result<UserSession, Error> {
        let token = self.deps.issue(Principal::user(user.id))?;
        Ok(UserSession { token, user })
    }
}

#[async_trait]
impl<R> UserAccounts for UserAccountService<R>
where
    R: UserRepository,
{
    async fn register(&self, registration: UserRegistration) -> Result<UserSession, Error> {
        let existing = self
            .repo
            .find_by_email(registration.email.as_str())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::conflict("email already registered"));
        }
        let now = self.deps.clock.utc();
        let password_hash = self.deps.hash(&registration.password).await?;
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email,
                avatar_url: None,
                favourite_teams: Vec::new(),
                followed_states: Vec::new(),
                created_at: now,
                updated_at: now,
            },
            credentials: Credentials::new(password_hash),
        };
        self.repo.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.user.id, "user registered");
        self.session(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<UserSession, Error> {
        let Some(account) = self
            .repo
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self
            .deps
            .verify(credentials.password(), &account.credentials.password_hash)
            .await?
        {
            debug!(user_id = %account.user.id, "user login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session(account.user)
    }

    async fn profile(&self, id: UserId) -> Result<User, Error> {
        Ok(self.load(&id).await?.user)
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut account = self.load(&id).await?;
        update.apply(&mut account.user, self.deps.clock.utc());
        self.store(&account).await?;
        Ok(account.user)
    }

    async fn update_avatar(&self, id: UserId, image: ImageUpload) -> Result<User, Error> {
        let mut account = self.load(&id).await?;
        let url = self.images.upload(&image).await.map_err(map_image_error)?;
        account.user.avatar_url = Some(url);
        account.user.updated_at = self.deps.clock.utc();
        self.store(&account).await?;
        Ok(account.user)
    }

    async fn change_password(
        &self,
        id: UserId,
        current: String,
        new_password: Password,
    ) -> Result<(), Error> {
        let mut account = self.load(&id).await?;
        self.deps
            .change_password(&mut account.credentials, &current, &new_password)
            .await?;
        account.user.updated_at = self.deps.clock.utc();
        self.store(&account).await?;
        info!(user_id = %id, "user password changed");
        Ok(())
    }

    async fn forgot_password(&self, email: String) -> Result<(), Error> {
        let Ok(email) = Email::parse(&email) else {
            return Ok(());
        };
        let Some(mut account) = self
            .repo
            .find_by_email(email.as_str())
            .await
            .map_err(map_user_error)?
        else {
            debug!("password reset requested for unknown e-mail");
            return Ok(());
        };
        let token = self.deps.begin_reset(&mut account.credentials);
        self.store(&account).await?;
        if let Err(err) = self
            .deps
            .send_reset_mail(&account.user.email, RESET_PATH, &token)
            .await
        {
            warn!(user_id = %account.user.id, error = %err, "reset e-mail failed; clearing token");
            account.credentials.reset = None;
            self.store(&account).await?;
        }
        Ok(())
    }

    async fn reset_password(&self, token: ResetToken, new_password: Password) -> Result<(), Error> {
        let Some(mut account) = self
            .repo
            .find_by_reset_token_hash(&token.digest())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::invalid_request(INVALID_RESET_TOKEN));
        };
        self.deps
            .complete_reset(&mut account.credentials, &token, &new_password)
            .await?;
        account.user.updated_at = self.deps.clock.utc();
        self.store(&account).await?;
        info!(user_id = %account.user.id, "user password reset");
        Ok(())
    }

    async fn delete_account(&self, id: UserId) -> Result<(), Error> {
        self.delete_user(id).await
    }

    async fn list_users(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        let search = search
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        self.repo.list(search, page).await.map_err(map_user_error)
    }

    async fn find_user(&self, id: UserId) -> Result<User, Error> {
        self.profile(id).await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        if self.repo.delete(&id).await.map_err(map_user_error)? {
            info!(user_id = %id, "user deleted");
            Ok(())
        } else {
            Err(user_not_found())
        }
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
