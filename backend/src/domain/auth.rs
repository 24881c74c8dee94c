//! Authentication primitives shared by fan and staff accounts.
//!
//! Inbound payloads are validated into these types before a service talks to
//! a port. Secrets are held in [`Zeroizing`] buffers and only the SHA-256
//! digest of a reset token is ever persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::validation::ValidationError;
use crate::domain::{AdminId, UserId};

/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 128;

const RESET_TOKEN_BYTES: usize = 32;

/// Normalised, lower-cased e-mail address.
///
/// ## Invariants
/// - exactly one `@` with a non-empty local part;
/// - the domain part contains a dot that is neither first nor last.
///
/// # Examples
/// ```
/// use pitchside::domain::Email;
///
/// let email = Email::parse("  Ada@Example.COM ").expect("valid e-mail");
/// assert_eq!(email.as_str(), "ada@example.com");
/// assert!(Email::parse("ada@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an e-mail address.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let candidate = raw.trim().to_lowercase();
        if candidate.is_empty() {
            return Err(ValidationError::Blank { field: "email" });
        }
        if candidate.chars().count() > 254 || candidate.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid("email", "is not a valid e-mail address"));
        }
        let mut parts = candidate.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ValidationError::invalid("email", "is not a valid e-mail address"));
        };
        let domain_ok = domain
            .find('.')
            .is_some_and(|_| !domain.starts_with('.') && !domain.ends_with('.'));
        if local.is_empty() || !domain_ok {
            return Err(ValidationError::invalid("email", "is not a valid e-mail address"));
        }
        Ok(Self(candidate))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// New password that satisfies the length policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Check `raw` against the password policy.
    ///
    /// Surrounding whitespace is kept; it is part of the secret.
    pub fn new(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Blank { field });
        }
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(ValidationError::TooShort {
                field,
                min: PASSWORD_MIN,
            });
        }
        if length > PASSWORD_MAX {
            return Err(ValidationError::TooLong {
                field,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plain-text secret, for hashing only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// PHC-formatted password hash as produced by the password hasher port.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a stored hash string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// E-mail and password submitted to a login endpoint.
///
/// No password policy is applied: the stored hash decides.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, ValidationError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::Blank { field: "email" });
        }
        if password.is_empty() {
            return Err(ValidationError::Blank { field: "password" });
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Lower-cased e-mail used for lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Role carried in bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Fan account.
    User,
    /// Staff account.
    Admin,
    /// Staff account allowed to manage other staff.
    SuperAdmin,
}

impl Role {
    /// Whether the role belongs to a staff account.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Stable string form used in token claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

/// Authenticated caller decoded from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    subject: Uuid,
    role: Role,
}

impl Principal {
    /// Build a principal for an account subject.
    pub const fn new(subject: Uuid, role: Role) -> Self {
        Self { subject, role }
    }

    /// Principal for a fan account.
    pub const fn user(id: UserId) -> Self {
        Self::new(*id.as_uuid(), Role::User)
    }

    /// Principal for a staff account.
    pub const fn admin(id: AdminId, role: Role) -> Self {
        Self::new(*id.as_uuid(), role)
    }

    /// Account identifier carried in the token.
    pub const fn subject(&self) -> Uuid {
        self.subject
    }

    /// Role carried in the token.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Subject as a fan id.
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.subject)
    }

    /// Subject as a staff id.
    pub const fn admin_id(&self) -> AdminId {
        AdminId::from_uuid(self.subject)
    }
}

/// Signed bearer token returned on successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Raw single-use reset token mailed to the account holder.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(Zeroizing<String>);

impl ResetToken {
    /// Generate 32 random bytes encoded as lower-case hex.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Wrap a token received from a reset link.
    pub fn from_raw(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Blank { field: "token" });
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Plain token, for building the reset link only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 hex digest stored alongside the account.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(***)")
    }
}

/// Stored reset request: token digest and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    /// SHA-256 hex digest of the raw token.
    pub token_hash: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl ResetTicket {
    /// Whether the ticket is still usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Secret material stored with an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Current password hash.
    pub password_hash: PasswordHash,
    /// Pending reset request, if any.
    pub reset: Option<ResetTicket>,
}

impl Credentials {
    /// Credentials with no pending reset.
    pub fn new(password_hash: PasswordHash) -> Self {
        Self {
            password_hash,
            reset: None,
        }
    }
}
