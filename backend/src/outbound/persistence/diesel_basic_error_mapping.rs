//! Shared Diesel error classification for the repositories.
//!
//! Each repository turns a [`DbFailure`] into its own port error, so the
//! connection/query/unique split is decided in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse outcome of a failed database call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DbFailure {
    /// The connection was lost or could not be obtained.
    Connection(String),
    /// The statement failed for any other reason.
    Query(String),
    /// A unique constraint rejected the write.
    Unique { constraint: Option<String> },
}

/// Extract a readable message from a pool error.
pub(super) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the database detail at debug level.
pub(super) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::Unique {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DeserializationError(err) => {
            DbFailure::Query(format!("row decoding failed: {err}"))
        }
        _ => DbFailure::Query("database error".to_owned()),
    }
}

/// Whether `failure` is a unique violation on `constraint`.
///
/// Some drivers omit the constraint name; any unique violation then counts.
pub(super) fn is_unique_violation(failure: &DbFailure, constraint: &str) -> bool {
    match failure {
        DbFailure::Unique { constraint: None } => true,
        DbFailure::Unique {
            constraint: Some(name),
        } => name == constraint,
        _ => false,
    }
}
