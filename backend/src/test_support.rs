//! Test doubles shared by unit tests across the crate.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    MailMessage, Mailer, MailerError, PasswordHashError, PasswordHasher, TokenError, TokenService,
};
use crate::domain::{IssuedToken, Password, PasswordHash, Principal, Role};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock frozen at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn advance(&self, delta: TimeDelta) {
        *lock(&self.0) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Reversible "hasher" so tests can assert on stored hashes cheaply.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain:{}", password.expose())))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str() == format!("plain:{candidate}"))
    }
}

/// Token service encoding the principal as `role:uuid`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTokens;

impl TokenService for PlainTokens {
    fn issue(&self, principal: Principal) -> Result<IssuedToken, TokenError> {
        Ok(IssuedToken {
            token: format!("{}:{}", principal.role().as_str(), principal.subject()),
            expires_at: DateTime::<Utc>::MAX_UTC,
        })
    }

    fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let (role, subject) = token
            .split_once(':')
            .ok_or_else(|| TokenError::invalid("missing separator"))?;
        let role = match role {
            "user" => Role::User,
            "admin" => Role::Admin,
            "super_admin" => Role::SuperAdmin,
            other => return Err(TokenError::invalid(format!("unknown role {other}"))),
        };
        let subject = Uuid::parse_str(subject).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(Principal::new(subject, role))
    }
}

/// Mailer that records messages and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    /// Mailer whose every send fails with a transport error.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<MailMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::transport("smtp down"));
        }
        lock(&self.sent).push(message.clone());
        Ok(())
    }
}
