//! Fan account model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::reference_data::nigerian_state;
use crate::domain::validation::{ValidationError, bounded_text, distinct_texts};
use crate::domain::{Credentials, Email, Password, UserId};

/// Maximum length of a first or last name.
pub const NAME_MAX: usize = 50;
/// Minimum length of a favourite team name.
pub const TEAM_NAME_MIN: usize = 2;
/// Maximum length of a favourite team name.
pub const TEAM_NAME_MAX: usize = 60;
/// Maximum number of favourite teams per account.
pub const FAVOURITE_TEAMS_MAX: usize = 20;

/// Public profile of a fan account.
///
/// Serialised in camelCase; credentials live in [`UserAccount`] and never
/// leave the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    #[schema(example = "Chioma")]
    pub first_name: String,
    #[schema(example = "Okafor")]
    pub last_name: String,
    #[schema(value_type = String, example = "chioma@example.ng")]
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub favourite_teams: Vec<String>,
    pub followed_states: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// `first last`, used as the author name on comments.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Persisted fan account: profile plus credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub credentials: Credentials,
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct UserRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: Password,
}

impl UserRegistration {
    /// Validate raw registration fields.
    pub fn try_new(
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: bounded_text("firstName", first_name, 1, NAME_MAX)?,
            last_name: bounded_text("lastName", last_name, 1, NAME_MAX)?,
            email: Email::parse(email)?,
            password: Password::new("password", password)?,
        })
    }
}

/// Partial profile update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub favourite_teams: Option<Vec<String>>,
    pub followed_states: Option<Vec<String>>,
}

impl ProfileUpdate {
    /// Validate the supplied fields.
    ///
    /// States are canonicalised against the Nigerian states list and
    /// de-duplicated.
    pub fn try_new(
        first_name: Option<&str>,
        last_name: Option<&str>,
        favourite_teams: Option<&[String]>,
        followed_states: Option<&[String]>,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name
            .map(|v| bounded_text("firstName", v, 1, NAME_MAX))
            .transpose()?;
        let last_name = last_name
            .map(|v| bounded_text("lastName", v, 1, NAME_MAX))
            .transpose()?;
        let favourite_teams = favourite_teams
            .map(|teams| {
                distinct_texts(
                    "favouriteTeams",
                    teams,
                    TEAM_NAME_MIN,
                    TEAM_NAME_MAX,
                    FAVOURITE_TEAMS_MAX,
                )
            })
            .transpose()?;
        let followed_states = followed_states.map(canonical_states).transpose()?;
        Ok(Self {
            first_name,
            last_name,
            favourite_teams,
            followed_states,
        })
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.favourite_teams.is_none()
            && self.followed_states.is_none()
    }

    /// Apply the update to `user`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(teams) = self.favourite_teams {
            user.favourite_teams = teams;
        }
        if let Some(states) = self.followed_states {
            user.followed_states = states;
        }
        user.updated_at = now;
    }
}

fn canonical_states(states: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut out: Vec<String> = Vec::with_capacity(states.len());
    for raw in states {
        let state = nigerian_state("followedStates", raw)?;
        if !out.contains(&state) {
            out.push(state);
        }
    }
    Ok(out)
}
