//! Credential flows and error mapping shared by the account and news services.
//!
//! Fan and staff accounts store the same [`Credentials`]; the password change
//! and reset logic lives here so both services apply identical rules.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{
    ImageStoreError, MailMessage, Mailer, MailerError, PasswordHashError, PasswordHasher,
    TokenError, TokenService, UserPersistenceError,
};
use crate::domain::{
    Credentials, Email, Error, IssuedToken, Password, PasswordHash, Principal, ResetTicket,
    ResetToken,
};

/// Message returned for every failed login, whatever the cause.
pub(crate) const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Message returned for unknown, used or expired reset tokens.
pub(crate) const INVALID_RESET_TOKEN: &str = "invalid or expired reset token";

/// Tunables for the credential flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Lifetime of a password reset token.
    pub reset_token_ttl: TimeDelta,
    /// Base URL of the web front end used in reset links, without a trailing slash.
    pub frontend_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            reset_token_ttl: TimeDelta::minutes(60),
            frontend_url: "http://localhost:3000".to_owned(),
        }
    }
}

/// Adapters shared by the fan and staff account services.
#[derive(Clone)]
pub struct AccountServiceDeps {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    pub settings: AuthSettings,
}

/// Run a hashing call on tokio's blocking pool.
async fn off_the_runtime<T, F>(work: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(map_hash_error)
}

impl AccountServiceDeps {
    pub(crate) async fn hash(&self, password: &Password) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.clone();
        off_the_runtime(move || hasher.hash(&password)).await
    }

    pub(crate) async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let candidate = Zeroizing::new(candidate.to_owned());
        let hash = hash.clone();
        off_the_runtime(move || hasher.verify(&candidate, &hash)).await
    }

    pub(crate) fn issue(&self, principal: Principal) -> Result<IssuedToken, Error> {
        self.tokens.issue(principal).map_err(map_token_error)
    }

    /// Replace the password after checking `current`; clears any pending reset.
    pub(crate) async fn change_password(
        &self,
        credentials: &mut Credentials,
        current: &str,
        new_password: &Password,
    ) -> Result<(), Error> {
        if !self.verify(current, &credentials.password_hash).await? {
            return Err(Error::unauthorized("current password is incorrect"));
        }
        if current == new_password.expose() {
            return Err(Error::invalid_field(
                "newPassword",
                "newPassword must differ from the current password",
            ));
        }
        credentials.password_hash = self.hash(new_password).await?;
        credentials.reset = None;
        Ok(())
    }

    /// Store a fresh reset ticket and return the raw token to mail.
    pub(crate) fn begin_reset(&self, credentials: &mut Credentials) -> ResetToken {
        let token = ResetToken::generate();
        credentials.reset = Some(ResetTicket {
            token_hash: token.digest(),
            expires_at: self.clock.utc() + self.settings.reset_token_ttl,
        });
        token
    }

    /// Consume the pending reset ticket and set the new password.
    pub(crate) async fn complete_reset(
        &self,
        credentials: &mut Credentials,
        token: &ResetToken,
        new_password: &Password,
    ) -> Result<(), Error> {
        let now = self.clock.utc();
        let valid = credentials
            .reset
            .as_ref()
            .is_some_and(|ticket| ticket.token_hash == token.digest() && ticket.is_valid_at(now));
        if !valid {
            return Err(Error::invalid_request(INVALID_RESET_TOKEN));
        }
        credentials.password_hash = self.hash(new_password).await?;
        credentials.reset = None;
        Ok(())
    }

    /// Mail a reset link pointing at `{frontend_url}{path_prefix}/{token}`.
    pub(crate) async fn send_reset_mail(
        &self,
        to: &Email,
        path_prefix: &str,
        token: &ResetToken,
    ) -> Result<(), MailerError> {
        let link = format!(
            "{}{}/{}",
            self.settings.frontend_url.trim_end_matches('/'),
            path_prefix,
            token.expose()
        );
        let minutes = self.settings.reset_token_ttl.num_minutes();
        let message = MailMessage {
            to: to.as_str().to_owned(),
            subject: "Reset your Pitchside password".to_owned(),
            text: format!(
                "Someone asked to reset the password for this account.\n\n\
                 Open the link below within {minutes} minutes to choose a new password:\n\n\
                 {link}\n\nIf you did not ask for this, you can ignore this e-mail."
            ),
        };
        self.mailer.send(&message).await
    }
}

pub(crate) fn map_hash_error(err: PasswordHashError) -> Error {
    warn!(error = %err, "password hashing failed");
    Error::internal(err.to_string())
}

pub(crate) fn map_token_error(err: TokenError) -> Error {
    match err {
        TokenError::Invalid { .. } | TokenError::Expired => {
            Error::unauthorized("invalid or expired token")
        }
        TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
    }
}

pub(crate) fn map_user_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => {
            warn!(%message, "user repository unavailable");
            Error::service_unavailable("user store is unavailable")
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository query failed: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("email already registered"),
    }
}

pub(crate) fn map_image_error(err: ImageStoreError) -> Error {
    match err {
        ImageStoreError::NotConfigured => {
            Error::service_unavailable("image uploads are not configured")
        }
        ImageStoreError::Transport { message } => {
            warn!(%message, "image store unreachable");
            Error::service_unavailable("image storage is unavailable")
        }
        ImageStoreError::Rejected { status, message } => {
            Error::internal(format!("image upload rejected ({status}): {message}"))
        }
    }
}
