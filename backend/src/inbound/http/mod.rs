//! HTTP inbound adapter exposing the REST endpoints under `/api`.

use std::sync::Arc;

use actix_web::web;

use crate::middleware::RateLimiter;

pub mod admins;
pub mod auth;
pub mod error;
pub mod health;
pub mod matches;
pub mod multipart;
pub mod news;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every REST scope; credential endpoints share `limiter`.
pub fn configure(cfg: &mut web::ServiceConfig, limiter: &Arc<RateLimiter>) {
    cfg.service(users::scope(limiter))
        .service(admins::scope(limiter))
        .service(matches::scope())
        .service(news::scope());
}
