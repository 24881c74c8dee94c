//! Bearer-token extractors used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! token parsing and role checks here. A missing, garbled, invalid or expired
//! token yields `401`; a valid token with the wrong role yields `403`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{AdminId, Error, Principal, Role, UserId};
use crate::inbound::http::state::HttpState;

const BEARER: &str = "bearer";

/// Extract the raw token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = value
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return Err(Error::unauthorized("malformed authorization header"));
    }
    Ok(Some(token))
}

fn map_token_error(err: &TokenError) -> Error {
    debug!(error = %err, "bearer token rejected");
    match err {
        TokenError::Expired => Error::unauthorized("token expired"),
        TokenError::Invalid { .. } | TokenError::Signing { .. } => {
            Error::unauthorized("invalid token")
        }
    }
}

fn verify(req: &HttpRequest, token: &str) -> Result<Principal, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    state.tokens.verify(token).map_err(|err| map_token_error(&err))
}

fn principal(req: &HttpRequest) -> Result<Principal, Error> {
    let token = bearer_token(req)?.ok_or_else(|| Error::unauthorized("authentication required"))?;
    verify(req, token)
}

fn require(principal: Principal, allowed: fn(Role) -> bool) -> Result<Principal, Error> {
    if allowed(principal.role()) {
        Ok(principal)
    } else {
        Err(Error::forbidden("insufficient permissions"))
    }
}

/// Any authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Principal);

/// Authenticated fan account.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

/// Authenticated staff account (`admin` or `super_admin`).
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAdmin(pub Principal);

impl AuthenticatedAdmin {
    /// Staff account id.
    pub fn id(&self) -> AdminId {
        self.0.admin_id()
    }
}

/// Authenticated super admin.
#[derive(Debug, Clone, Copy)]
pub struct SuperAdmin(pub AdminId);

/// Caller identity when a valid bearer token is present.
///
/// Public endpoints use this to widen what staff can see; an invalid token
/// is treated as anonymous rather than rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalPrincipal(pub Option<Principal>);

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(principal(req).map(Self))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            principal(req)
                .and_then(|p| require(p, |role| role == Role::User))
                .map(|p| Self(p.user_id())),
        )
    }
}

impl FromRequest for AuthenticatedAdmin {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            principal(req)
                .and_then(|p| require(p, Role::is_staff))
                .map(Self),
        )
    }
}

impl FromRequest for SuperAdmin {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            principal(req)
                .and_then(|p| require(p, |role| role == Role::SuperAdmin))
                .map(|p| Self(p.admin_id())),
        )
    }
}

impl FromRequest for OptionalPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let resolved = match bearer_token(req) {
            Ok(Some(token)) => verify(req, token).ok(),
            Ok(None) | Err(_) => None,
        };
        ready(Ok(Self(resolved)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;
    use uuid::Uuid;

    use crate::inbound::http::test_utils::{http_state, token_for};

    async fn status_for(uri: &str, authorization: Option<String>) -> StatusCode {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(http_state()))
                .route(
                    "/any",
                    web::get().to(|_: Authenticated| async { HttpResponse::Ok().finish() }),
                )
                .route(
                    "/user",
                    web::get().to(|_: AuthenticatedUser| async { HttpResponse::Ok().finish() }),
                )
                .route(
                    "/admin",
                    web::get().to(|_: AuthenticatedAdmin| async { HttpResponse::Ok().finish() }),
                )
                .route(
                    "/super",
                    web::get().to(|_: SuperAdmin| async { HttpResponse::Ok().finish() }),
                )
                .route(
                    "/optional",
                    web::get().to(|caller: OptionalPrincipal| async move {
                        HttpResponse::Ok().body(if caller.0.is_some() { "known" } else { "anon" })
                    }),
                ),
        )
        .await;
        let mut request = test::TestRequest::get().uri(uri);
        if let Some(value) = authorization {
            request = request.insert_header((AUTHORIZATION, value));
        }
        test::call_service(&app, request.to_request()).await.status()
    }

    fn bearer(role: Role) -> Option<String> {
        Some(format!("Bearer {}", token_for(Principal::new(Uuid::new_v4(), role))))
    }

    #[rstest]
    #[case("/any", None, StatusCode::UNAUTHORIZED)]
    #[case("/any", Some("Basic abc".to_owned()), StatusCode::UNAUTHORIZED)]
    #[case("/any", Some("Bearer ".to_owned()), StatusCode::UNAUTHORIZED)]
    #[case("/any", Some("Bearer not-a-token".to_owned()), StatusCode::UNAUTHORIZED)]
    #[case("/any", bearer(Role::User), StatusCode::OK)]
    #[case("/user", bearer(Role::User), StatusCode::OK)]
    #[case("/user", bearer(Role::Admin), StatusCode::FORBIDDEN)]
    #[case("/admin", bearer(Role::User), StatusCode::FORBIDDEN)]
    #[case("/admin", bearer(Role::Admin), StatusCode::OK)]
    #[case("/admin", bearer(Role::SuperAdmin), StatusCode::OK)]
    #[case("/super", bearer(Role::Admin), StatusCode::FORBIDDEN)]
    #[case("/super", bearer(Role::SuperAdmin), StatusCode::OK)]
    #[case("/optional", None, StatusCode::OK)]
    #[case("/optional", Some("Bearer garbage".to_owned()), StatusCode::OK)]
    #[actix_web::test]
    async fn extractors_enforce_roles(
        #[case] uri: &str,
        #[case] authorization: Option<String>,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(status_for(uri, authorization).await, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_tokens_are_unauthorised() {
        assert_eq!(
            status_for("/any", Some("Bearer expired".to_owned())).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
