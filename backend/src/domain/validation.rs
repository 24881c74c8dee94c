//! Field-level validation shared by the account, match and news models.
//!
//! Constructors in the domain return [`ValidationError`]; services convert it
//! into an `invalid_request` [`Error`] whose details name the offending field.

use std::collections::BTreeSet;

use crate::domain::Error;

/// A single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required value was missing or only whitespace.
    #[error("{field} is required")]
    Blank { field: &'static str },
    /// Value is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    /// Value is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// Collection holds more entries than allowed.
    #[error("{field} accepts at most {max} entries")]
    TooMany { field: &'static str, max: usize },
    /// Numeric value outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    /// Value is not one of the accepted options.
    #[error("{field} must be one of: {expected}")]
    NotAllowed {
        field: &'static str,
        expected: String,
    },
    /// Any other rule violation, described by `reason`.
    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::TooMany { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotAllowed { field, .. }
            | Self::Invalid { field, .. } => field,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::invalid_field(err.field(), err.to_string())
    }
}

/// Trim `value` and check its length in characters.
pub(crate) fn bounded_text(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    let length = trimmed.chars().count();
    if length < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if length > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Like [`bounded_text`] but maps blank input to `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => bounded_text(field, v, 1, max).map(Some),
    }
}

/// Validate every entry of a list, dropping case-insensitive duplicates.
pub(crate) fn distinct_texts<I, S>(
    field: &'static str,
    values: I,
    min: usize,
    max: usize,
    max_entries: usize,
) -> Result<Vec<String>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for value in values {
        let entry = bounded_text(field, value.as_ref(), min, max)?;
        if seen.insert(entry.to_lowercase()) {
            out.push(entry);
        }
    }
    if out.len() > max_entries {
        return Err(ValidationError::TooMany {
            field,
            max: max_entries,
        });
    }
    Ok(out)
}
