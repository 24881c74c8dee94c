//! Fixed-window rate limiting for credential endpoints.
//!
//! Attempts are counted per `(scope, client ip)`. A window opens on the first
//! attempt and admits `max_attempts` requests until it expires; further
//! requests are refused with `429 Too Many Requests` and a `Retry-After`
//! header. Expired windows are pruned once the table grows past
//! [`PRUNE_THRESHOLD`] entries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::ResponseError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use tracing::warn;

use crate::domain::Error;
use crate::inbound::http::error::RETRY_AFTER_DETAIL;

/// Table size above which expired windows are dropped.
pub const PRUNE_THRESHOLD: usize = 1024;

/// Attempts allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    attempts: u32,
}

/// Shared attempt counters.
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<(&'static str, String), Window>>,
}

impl RateLimiter {
    /// Limiter applying `config` to every scope.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt at `now`.
    ///
    /// Returns how long the caller must wait when the window is exhausted.
    pub fn check_at(&self, scope: &'static str, client: &str, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() > PRUNE_THRESHOLD {
            let span = self.config.window;
            windows.retain(|_, w| now.saturating_duration_since(w.opened) < span);
        }
        let window = windows
            .entry((scope, client.to_owned()))
            .or_insert(Window {
                opened: now,
                attempts: 0,
            });
        let elapsed = now.saturating_duration_since(window.opened);
        if elapsed >= self.config.window {
            *window = Window {
                opened: now,
                attempts: 0,
            };
        }
        if window.attempts >= self.config.max_attempts {
            return Err(self
                .config
                .window
                .saturating_sub(now.saturating_duration_since(window.opened)));
        }
        window.attempts += 1;
        Ok(())
    }

    /// Record an attempt now.
    pub fn check(&self, scope: &'static str, client: &str) -> Result<(), Duration> {
        self.check_at(scope, client, Instant::now())
    }

    fn tracked(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Middleware applying a [`RateLimiter`] under a named scope.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, HttpResponse, web};
/// use pitchside::middleware::{RateLimit, RateLimiter};
///
/// let limiter = Arc::new(RateLimiter::default());
/// let app = App::new().service(
///     web::resource("/login")
///         .wrap(RateLimit::new(limiter, "user.login"))
///         .route(web::post().to(HttpResponse::Ok)),
/// );
/// ```
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
    scope: &'static str,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>, scope: &'static str) -> Self {
        Self { limiter, scope }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
            scope: self.scope,
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<RateLimiter>,
    scope: &'static str,
}

fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string())
}

fn throttled(wait: Duration) -> Error {
    let seconds = wait.as_secs().max(1);
    Error::too_many_requests("too many attempts, please try again later")
        .with_details(json!({ RETRY_AFTER_DETAIL: seconds }))
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = client_key(&req);
        if let Err(wait) = self.limiter.check(self.scope, &client) {
            warn!(scope = self.scope, %client, retry_after_secs = wait.as_secs(), "rate limit exceeded");
            let response = throttled(wait).error_response();
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::RETRY_AFTER;
    use actix_web::test::{self};
    use actix_web::{App, HttpResponse, web};
    use rstest::rstest;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_attempts,
            window: Duration::from_secs(60),
        })
    }

    #[rstest]
    fn admits_up_to_the_limit_then_refuses() {
        let limiter = limiter(3);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at("login", "10.0.0.1", now).is_ok());
        }
        let wait = limiter
            .check_at("login", "10.0.0.1", now + Duration::from_secs(20))
            .expect_err("limited");
        assert_eq!(wait, Duration::from_secs(40));
    }

    #[rstest]
    fn scopes_and_clients_are_counted_separately() {
        let limiter = limiter(1);
        let now = Instant::now();
        assert!(limiter.check_at("login", "10.0.0.1", now).is_ok());
        assert!(limiter.check_at("register", "10.0.0.1", now).is_ok());
        assert!(limiter.check_at("login", "10.0.0.2", now).is_ok());
        assert!(limiter.check_at("login", "10.0.0.1", now).is_err());
    }

    #[rstest]
    fn window_resets_after_expiry() {
        let limiter = limiter(1);
        let now = Instant::now();
        assert!(limiter.check_at("login", "10.0.0.1", now).is_ok());
        assert!(limiter.check_at("login", "10.0.0.1", now).is_err());
        assert!(
            limiter
                .check_at("login", "10.0.0.1", now + Duration::from_secs(60))
                .is_ok()
        );
    }

    #[rstest]
    fn expired_windows_are_pruned_past_threshold() {
        let limiter = limiter(1);
        let start = Instant::now();
        for i in 0..=PRUNE_THRESHOLD {
            assert!(limiter.check_at("login", &format!("client-{i}"), start).is_ok());
        }
        assert_eq!(limiter.tracked(), PRUNE_THRESHOLD + 1);
        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("login", "fresh", later).is_ok());
        assert_eq!(limiter.tracked(), 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn eleventh_attempt_is_refused_with_retry_after() {
        let limiter = Arc::new(RateLimiter::default());
        let app = test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new(limiter, "user.login"))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;
        let peer = "192.0.2.7:4000".parse().expect("socket addr");
        for _ in 0..10 {
            let req = test::TestRequest::post()
                .uri("/login")
                .peer_addr(peer)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        let req = test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer)
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(RETRY_AFTER));
    }
}
