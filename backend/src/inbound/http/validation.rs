//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies, queries and path segments that fail to parse are reported
//! through the same JSON error envelope as domain validation failures.

use actix_web::{HttpRequest, web};
use chrono::{DateTime, Utc};
use pagination::{PageRequest, PageRequestError};
use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde_json::json;

use crate::domain::{Error, IdParseError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidPagination,
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidPagination => "invalid_pagination",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

fn field_error(field: &str, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: &'static str) -> Error {
    field_error(
        field,
        format!("missing required field: {field}"),
        ErrorCode::MissingField,
    )
}

/// Parse a path identifier, reporting failures against `field`.
pub(crate) fn parse_id<T>(
    raw: &str,
    field: &'static str,
    parse: fn(&str) -> Result<T, IdParseError>,
) -> Result<T, Error> {
    parse(raw).map_err(|err| field_error(field, err.to_string(), ErrorCode::InvalidUuid))
}

pub(crate) fn parse_rfc3339_timestamp(value: &str, field: &'static str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_error(
                field,
                format!("{field} must be an RFC 3339 timestamp"),
                ErrorCode::InvalidTimestamp,
            )
        })
}

/// Parse a snake_case enum value such as an event type or side.
pub(crate) fn parse_variant<'de, T>(raw: &'de str, field: &'static str) -> Result<T, Error>
where
    T: Deserialize<'de>,
{
    let deserializer: StrDeserializer<'de, ValueError> = raw.trim().into_deserializer();
    T::deserialize(deserializer)
        .map_err(|err| field_error(field, format!("{field}: {err}"), ErrorCode::InvalidValue))
}

/// Check an integer lies within `0..=max`.
pub(crate) fn bounded_u32(value: i64, field: &'static str, max: u32) -> Result<u32, Error> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or_else(|| {
            field_error(
                field,
                format!("{field} must be between 0 and {max}"),
                ErrorCode::OutOfRange,
            )
        })
}

/// Validate `page` and `limit` query parameters.
pub(crate) fn page_request(page: Option<u64>, limit: Option<u64>) -> Result<PageRequest, Error> {
    PageRequest::try_new(page, limit).map_err(|err| {
        let field = match err {
            PageRequestError::PageOutOfRange => "page",
            PageRequestError::LimitOutOfRange { .. } => "limit",
        };
        field_error(field, err.to_string(), ErrorCode::InvalidPagination)
    })
}

/// Treat blank query values as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// JSON extractor settings reporting malformed bodies as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    })
}

/// Query extractor settings reporting malformed queries as `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        Error::invalid_request(format!("invalid query string: {err}")).into()
    })
}
