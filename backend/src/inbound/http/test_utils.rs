//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    MockAdminAccounts, MockMatchCommand, MockMatchQuery, MockNewsCommand, MockNewsQuery,
    MockUserAccounts, TokenError, TokenService,
};
use crate::domain::{IssuedToken, Principal, Role};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_config, query_config};
use crate::middleware::RateLimiter;

/// Token service with readable tokens of the form `<role>:<subject>`.
///
/// The literal token `expired` verifies as [`TokenError::Expired`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StubTokens;

impl TokenService for StubTokens {
    fn issue(&self, principal: Principal) -> Result<IssuedToken, TokenError> {
        Ok(IssuedToken {
            token: token_for(principal),
            expires_at: DateTime::<Utc>::UNIX_EPOCH,
        })
    }

    fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        if token == "expired" {
            return Err(TokenError::expired());
        }
        let (role, subject) = token
            .split_once(':')
            .ok_or_else(|| TokenError::invalid("missing separator"))?;
        let role = match role {
            "user" => Role::User,
            "admin" => Role::Admin,
            "super_admin" => Role::SuperAdmin,
            other => return Err(TokenError::invalid(format!("unknown role {other}"))),
        };
        let subject = Uuid::parse_str(subject).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(Principal::new(subject, role))
    }
}

/// Token accepted by [`StubTokens`] for `principal`.
pub fn token_for(principal: Principal) -> String {
    format!("{}:{}", principal.role().as_str(), principal.subject())
}

/// `Authorization` header carrying a [`StubTokens`] token.
pub fn bearer(principal: Principal) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token_for(principal)))
}

/// State whose ports are expectation-free mocks; replace the ones a test needs.
pub fn http_state() -> HttpState {
    HttpState {
        users: Arc::new(MockUserAccounts::new()),
        admins: Arc::new(MockAdminAccounts::new()),
        matches: Arc::new(MockMatchCommand::new()),
        matches_query: Arc::new(MockMatchQuery::new()),
        news: Arc::new(MockNewsCommand::new()),
        news_query: Arc::new(MockNewsQuery::new()),
        tokens: Arc::new(StubTokens),
    }
}

/// App serving every REST route against `state` with a fresh rate limiter.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let limiter = Arc::new(RateLimiter::default());
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .configure(|cfg| super::configure(cfg, &limiter))
}
