//! Optimistic concurrency for aggregates that are read, changed and written
//! back whole.
//!
//! Repositories only accept a write when the stored `updated_at` still
//! equals the value the caller read. Each write therefore has to move the
//! stamp forward, even when the clock has not.

use chrono::{DateTime, TimeDelta, Utc};

/// Load-and-write rounds tried before a contended write becomes a conflict.
pub(crate) const WRITE_ATTEMPTS: u32 = 3;

/// Stamp for the write following one stamped `previous`.
///
/// PostgreSQL keeps microseconds, so the stamp advances by at least one.
pub(crate) fn next_stamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + TimeDelta::microseconds(1))
}
