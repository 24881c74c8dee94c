//! Shared helpers for Diesel repository implementations.
//!
//! - ILIKE pattern construction with escaping
//! - Page/limit to LIMIT/OFFSET conversion
//! - JSONB encode/decode for embedded documents

use pagination::PageRequest;
use serde::Serialize;
use serde::de::DeserializeOwned;

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// ILIKE pattern matching `term` anywhere in the column.
pub(super) fn like_contains(term: &str) -> String {
    format!("%{}%", escape_like(term.trim()))
}

/// ILIKE pattern matching the column exactly, ignoring case.
pub(super) fn like_exact(term: &str) -> String {
    escape_like(term.trim())
}

/// `(limit, offset)` for a page request, saturating at `i64::MAX`.
pub(super) fn page_window(page: PageRequest) -> (i64, i64) {
    let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

/// Convert a `COUNT(*)` result to the page total.
pub(super) fn total_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Encode an embedded document for a JSONB column.
pub(super) fn to_json<T: Serialize>(value: &T, column: &str) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| format!("encode {column}: {err}"))
}

/// Decode an embedded document from a JSONB column.
pub(super) fn from_json<T: DeserializeOwned>(
    value: serde_json::Value,
    column: &str,
) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| format!("decode {column}: {err}"))
}
