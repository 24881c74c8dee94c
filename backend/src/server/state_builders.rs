//! Builders wiring outbound adapters into the HTTP and WebSocket state.
//!
//! Diesel repositories are used when a pool is configured; otherwise every
//! aggregate lives in memory for the lifetime of the process.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use pitchside::domain::ports::{
    AdminRepository, ImageStore, Mailer, MatchRepository, MatchUpdatePublisher, NewsRepository,
    TokenService, UnconfiguredImageStore, UserRepository,
};
use pitchside::domain::{
    AccountServiceDeps, AdminAccountService, MatchService, NewsService, UserAccountService,
};
use pitchside::inbound::http::health::HealthState;
use pitchside::inbound::http::state::HttpState;
use pitchside::inbound::ws::state::WsState;
use pitchside::middleware::RateLimiter;
use pitchside::outbound::broadcast::MatchUpdateHub;
use pitchside::outbound::mail::{HttpMailer, LogMailer};
use pitchside::outbound::media::CloudinaryImageStore;
use pitchside::outbound::memory::{
    MemoryAdminRepository, MemoryMatchRepository, MemoryNewsRepository, MemoryUserRepository,
};
use pitchside::outbound::persistence::{
    DieselAdminRepository, DieselMatchRepository, DieselNewsRepository, DieselUserRepository,
};
use pitchside::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Shared state handed to every worker's `App`.
#[derive(Clone)]
pub(crate) struct AppStates {
    pub(crate) health: web::Data<HealthState>,
    pub(crate) http: web::Data<HttpState>,
    pub(crate) ws: web::Data<WsState>,
    pub(crate) limiter: Arc<RateLimiter>,
}

/// Adapters shared by every service regardless of storage.
struct Adapters {
    deps: AccountServiceDeps,
    images: Arc<dyn ImageStore>,
    publisher: Arc<dyn MatchUpdatePublisher>,
    clock: Arc<dyn Clock>,
}

fn build_tokens(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn TokenService>> {
    let tokens = match &config.jwt_secret {
        Some(secret) => JwtTokenService::new(secret, config.jwt_ttl, clock),
        None => {
            warn!("PITCHSIDE_JWT_SECRET unset; signing tokens with the development secret");
            JwtTokenService::development(config.jwt_ttl, clock)
        }
    };
    tokens
        .map(|service| Arc::new(service) as Arc<dyn TokenService>)
        .map_err(std::io::Error::other)
}

fn build_mailer(config: &ServerConfig) -> std::io::Result<Arc<dyn Mailer>> {
    match &config.mailer {
        Some(mailer) => {
            let mailer = HttpMailer::new(mailer.clone()).map_err(std::io::Error::other)?;
            Ok(Arc::new(mailer))
        }
        None => {
            info!("mail API not configured; reset mails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

fn build_images(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn ImageStore>> {
    match &config.cloudinary {
        Some(cloudinary) => {
            let store = CloudinaryImageStore::new(cloudinary.clone(), clock)
                .map_err(std::io::Error::other)?;
            Ok(Arc::new(store))
        }
        None => {
            info!("Cloudinary not configured; image uploads will be refused");
            Ok(Arc::new(UnconfiguredImageStore))
        }
    }
}

fn build_http_state<U, A, M, N>(
    users: Arc<U>,
    admins: Arc<A>,
    matches: Arc<M>,
    news: Arc<N>,
    adapters: Adapters,
) -> HttpState
where
    U: UserRepository + 'static,
    A: AdminRepository + 'static,
    M: MatchRepository + 'static,
    N: NewsRepository + 'static,
{
    let Adapters {
        deps,
        images,
        publisher,
        clock,
    } = adapters;
    let tokens = Arc::clone(&deps.tokens);
    let match_service = Arc::new(MatchService::new(matches, publisher, Arc::clone(&clock)));
    let news_service = Arc::new(NewsService::new(
        news,
        Arc::clone(&users),
        Arc::clone(&images),
        clock,
    ));
    HttpState {
        users: Arc::new(UserAccountService::new(users, images, deps.clone())),
        admins: Arc::new(AdminAccountService::new(admins, deps)),
        matches: match_service.clone(),
        matches_query: match_service,
        news: news_service.clone(),
        news_query: news_service,
        tokens,
    }
}

/// Build every piece of shared state from `config`.
///
/// # Errors
/// Returns [`std::io::Error`] when an adapter rejects its configuration.
pub(crate) fn build_states(config: &ServerConfig) -> std::io::Result<AppStates> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hub = Arc::new(MatchUpdateHub::default());
    let adapters = Adapters {
        deps: AccountServiceDeps {
            hasher: Arc::new(Argon2PasswordHasher::default()),
            tokens: build_tokens(config, Arc::clone(&clock))?,
            mailer: build_mailer(config)?,
            clock: Arc::clone(&clock),
            settings: config.auth.clone(),
        },
        images: build_images(config, Arc::clone(&clock))?,
        publisher: hub.clone(),
        clock,
    };

    let (http, health) = match &config.db_pool {
        Some(pool) => {
            let http = build_http_state(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselAdminRepository::new(pool.clone())),
                Arc::new(DieselMatchRepository::new(pool.clone())),
                Arc::new(DieselNewsRepository::new(pool.clone())),
                adapters,
            );
            (http, HealthState::new().with_probe(Arc::new(pool.clone())))
        }
        None => {
            warn!("no database configured; using in-memory repositories");
            let http = build_http_state(
                Arc::new(MemoryUserRepository::new()),
                Arc::new(MemoryAdminRepository::new()),
                Arc::new(MemoryMatchRepository::new()),
                Arc::new(MemoryNewsRepository::new()),
                adapters,
            );
            (http, HealthState::new())
        }
    };

    Ok(AppStates {
        health: web::Data::new(health),
        http: web::Data::new(http),
        ws: web::Data::new(WsState::new(hub, config.origins.clone())),
        limiter: Arc::new(RateLimiter::new(config.rate_limit)),
    })
}
