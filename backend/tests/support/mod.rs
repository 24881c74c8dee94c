//! Shared harness for end-to-end tests against the in-memory adapters.
//!
//! The app is assembled the same way the server binary assembles it, but
//! with cheap Argon2 parameters, a clock the test can move and a mailer that
//! records what it would have sent.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use pitchside::Trace;
use pitchside::domain::ports::{MailMessage, Mailer, MailerError, UnconfiguredImageStore};
use pitchside::domain::{
    AccountServiceDeps, AdminAccountService, AuthSettings, MatchService, NewsService,
    UserAccountService,
};
use pitchside::inbound::http::state::HttpState;
use pitchside::inbound::http::validation::{json_config, query_config};
use pitchside::middleware::{RateLimitConfig, RateLimiter};
use pitchside::outbound::broadcast::MatchUpdateHub;
use pitchside::outbound::memory::{
    MemoryAdminRepository, MemoryMatchRepository, MemoryNewsRepository, MemoryUserRepository,
};
use pitchside::outbound::security::{Argon2PasswordHasher, JwtTokenService};

pub const PASSWORD: &str = "Sup3r-Eagles";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clock that starts at the current time and only moves when told to.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    fn new() -> Self {
        Self(Mutex::new(Utc::now()))
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = lock(&self.0);
        *now += delta;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Mailer keeping every message in memory.
#[derive(Default)]
pub struct RecordingMailer(Mutex<Vec<MailMessage>>);

impl RecordingMailer {
    pub fn sent(&self) -> Vec<MailMessage> {
        lock(&self.0).clone()
    }

    /// Raw token from the link in the most recent message to `to`.
    pub fn reset_token_for(&self, to: &str) -> Option<String> {
        self.sent()
            .iter()
            .rev()
            .find(|message| message.to == to)
            .and_then(|message| {
                message
                    .text
                    .lines()
                    .find(|line| line.starts_with("http"))
                    .and_then(|link| link.rsplit('/').next())
                    .map(str::to_owned)
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        lock(&self.0).push(message.clone());
        Ok(())
    }
}

/// Adapters and state behind one test application.
pub struct Harness {
    http: web::Data<HttpState>,
    limiter: Arc<RateLimiter>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<SteppingClock>,
    pub hub: Arc<MatchUpdateHub>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::with_rate_limit(RateLimitConfig::default())
    }
}

impl Harness {
    pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        let clock = Arc::new(SteppingClock::new());
        let mailer = Arc::new(RecordingMailer::default());
        let hub = Arc::new(MatchUpdateHub::default());
        let tokens = Arc::new(
            JwtTokenService::development(TimeDelta::hours(1), clock.clone()).expect("jwt"),
        );
        let deps = AccountServiceDeps {
            hasher: Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1).expect("argon2")),
            tokens: tokens.clone(),
            mailer: mailer.clone(),
            clock: clock.clone(),
            settings: AuthSettings::default(),
        };
        let users = Arc::new(MemoryUserRepository::new());
        let matches = Arc::new(MatchService::new(
            Arc::new(MemoryMatchRepository::new()),
            hub.clone(),
            clock.clone(),
        ));
        let news = Arc::new(NewsService::new(
            Arc::new(MemoryNewsRepository::new()),
            users.clone(),
            Arc::new(UnconfiguredImageStore),
            clock.clone(),
        ));
        let state = HttpState {
            users: Arc::new(UserAccountService::new(
                users,
                Arc::new(UnconfiguredImageStore),
                deps.clone(),
            )),
            admins: Arc::new(AdminAccountService::new(
                Arc::new(MemoryAdminRepository::new()),
                deps,
            )),
            matches: matches.clone(),
            matches_query: matches,
            news: news.clone(),
            news_query: news,
            tokens,
        };
        Self {
            http: web::Data::new(state),
            limiter: Arc::new(RateLimiter::new(rate_limit)),
            mailer,
            clock,
            hub,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let limiter = Arc::clone(&self.limiter);
        App::new()
            .app_data(self.http.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(Trace)
            .configure(move |cfg| pitchside::inbound::http::configure(cfg, &limiter))
    }
}

/// Peer address used for every request so rate limits apply consistently.
pub fn peer() -> SocketAddr {
    SocketAddr::from(([203, 0, 113, 7], 40_000))
}

/// Send `req` and decode the JSON body, or `Null` for empty bodies.
pub async fn send<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, req.peer_addr(peer()).to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Register a fan and return their token.
pub async fn register_fan<S, B>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/user/register").set_json(json!({
            "firstName": "Ngozi",
            "lastName": "Eze",
            "email": email,
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().expect("token").to_owned()
}

/// Register the first (super) admin and return their token.
pub async fn bootstrap_admin<S, B>(app: &S) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/admin/register").set_json(json!({
            "name": "Desk Editor",
            "email": "desk@pitchside.ng",
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["admin"]["role"], "super_admin");
    body["token"].as_str().expect("token").to_owned()
}
