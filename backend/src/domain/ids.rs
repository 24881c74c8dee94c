//! Strongly typed UUID identifiers for persisted resources.
//!
//! Each identifier serialises as its canonical hyphenated string so JSON
//! payloads and path segments agree.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failure parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct IdParseError {
    kind: &'static str,
}

impl IdParseError {
    /// Human-readable identifier kind, e.g. `match id`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse an identifier from its string form.
            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| IdParseError { kind: $kind })
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_id!(
    /// Identifier of a fan account.
    UserId,
    "user id"
);
define_id!(
    /// Identifier of a staff account.
    AdminId,
    "admin id"
);
define_id!(
    /// Identifier of a fixture.
    MatchId,
    "match id"
);
define_id!(
    /// Identifier of an event recorded against a match.
    MatchEventId,
    "event id"
);
define_id!(
    /// Identifier of a news article.
    NewsId,
    "news id"
);
define_id!(
    /// Identifier of a comment on a news article.
    CommentId,
    "comment id"
);
