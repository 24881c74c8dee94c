//! Pitchside backend library: football news, fixtures and live match updates.
//!
//! The crate follows a hexagonal layout. [`domain`] owns the aggregates,
//! validation rules and use-case services; [`inbound`] exposes them over
//! REST and WebSocket; [`outbound`] implements the driven ports against
//! PostgreSQL, Argon2, JWT, Cloudinary and a mail API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
