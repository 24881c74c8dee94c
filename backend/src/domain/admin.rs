//! Staff account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::validation::{ValidationError, bounded_text};
use crate::domain::{AdminId, Credentials, Email, Password, Role};

/// Minimum length of an admin display name.
pub const ADMIN_NAME_MIN: usize = 2;
/// Maximum length of an admin display name.
pub const ADMIN_NAME_MAX: usize = 80;

/// Staff privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Manages content, fixtures and fan accounts.
    Admin,
    /// Additionally manages other staff accounts.
    SuperAdmin,
}

impl AdminRole {
    /// Token role for this staff level.
    pub fn as_role(self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::SuperAdmin => Role::SuperAdmin,
        }
    }

    /// Stable string form stored by persistence adapters.
    pub fn as_str(self) -> &'static str {
        self.as_role().as_str()
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(ValidationError::NotAllowed {
                field: "role",
                expected: "admin, super_admin".to_owned(),
            }),
        }
    }
}

/// Public profile of a staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[schema(value_type = String, format = Uuid)]
    pub id: AdminId,
    #[schema(example = "Tunde Bakare")]
    pub name: String,
    #[schema(value_type = String, example = "desk@pitchside.ng")]
    pub email: Email,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted staff account: profile plus credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub admin: Admin,
    pub credentials: Credentials,
}

/// Validated staff registration payload.
///
/// `role` is what the caller asked for; the service decides what is granted.
#[derive(Debug, Clone)]
pub struct AdminRegistration {
    pub name: String,
    pub email: Email,
    pub password: Password,
    pub role: Option<AdminRole>,
}

impl AdminRegistration {
    /// Validate raw registration fields.
    pub fn try_new(
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: bounded_text("name", name, ADMIN_NAME_MIN, ADMIN_NAME_MAX)?,
            email: Email::parse(email)?,
            password: Password::new("password", password)?,
            role: role
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(AdminRole::parse)
                .transpose()?,
        })
    }
}
