//! Runtime settings loaded via OrthoConfig and the server configuration
//! derived from them.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use pitchside::domain::AuthSettings;
use pitchside::inbound::ws::state::AllowedOrigins;
use pitchside::middleware::RateLimitConfig;
use pitchside::outbound::mail::HttpMailerConfig;
use pitchside::outbound::media::CloudinaryConfig;
use pitchside::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_TTL_HOURS: i64 = 24 * 7;
const DEFAULT_RESET_TTL_MINUTES: i64 = 60;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_MAIL_FROM: &str = "Pitchside <no-reply@pitchside.ng>";
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings read from `PITCHSIDE_*` variables, config files and flags.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PITCHSIDE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory repositories are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in hours.
    pub jwt_ttl_hours: Option<i64>,
    /// Password reset token lifetime in minutes.
    pub reset_token_ttl_minutes: Option<i64>,
    /// Web front end base URL used in reset links.
    pub frontend_url: Option<String>,
    /// Comma-separated origins allowed to open `/ws`.
    pub ws_origins: Option<String>,
    /// Credential attempts allowed per window.
    pub rate_limit_attempts: Option<u32>,
    /// Rate limit window in seconds.
    pub rate_limit_window_secs: Option<u64>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    /// Send endpoint of the mail API.
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: Option<String>,
}

/// Invalid settings detected at start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("{name} must be positive")]
    NonPositive { name: &'static str },
    #[error("invalid URL in {name}: {message}")]
    Url { name: &'static str, message: String },
    #[error("PITCHSIDE_JWT_SECRET is required in release builds")]
    MissingJwtSecret,
}

impl AppSettings {
    /// Pool settings for the configured database, if any.
    ///
    /// # Errors
    /// Returns [`SettingsError::NonPositive`] for a zero connection limit.
    pub fn pool_config(&self) -> Result<Option<PoolConfig>, SettingsError> {
        let Some(url) = non_empty(self.database_url.as_deref()) else {
            return Ok(None);
        };
        let max_size = self
            .db_max_connections
            .unwrap_or(PoolConfig::DEFAULT_MAX_SIZE);
        if max_size == 0 {
            return Err(SettingsError::NonPositive {
                name: "db_max_connections",
            });
        }
        Ok(Some(PoolConfig::new(url).with_max_size(max_size)))
    }

    fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    fn jwt_ttl(&self) -> Result<TimeDelta, SettingsError> {
        positive_hours(self.jwt_ttl_hours.unwrap_or(DEFAULT_JWT_TTL_HOURS), "jwt_ttl_hours")
    }

    fn auth_settings(&self) -> Result<AuthSettings, SettingsError> {
        let minutes = self
            .reset_token_ttl_minutes
            .unwrap_or(DEFAULT_RESET_TTL_MINUTES);
        if minutes <= 0 {
            return Err(SettingsError::NonPositive {
                name: "reset_token_ttl_minutes",
            });
        }
        let frontend = self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL);
        Url::parse(frontend).map_err(|err| SettingsError::Url {
            name: "frontend_url",
            message: err.to_string(),
        })?;
        Ok(AuthSettings {
            reset_token_ttl: TimeDelta::minutes(minutes),
            frontend_url: frontend.trim_end_matches('/').to_owned(),
        })
    }

    fn origins(&self) -> Result<AllowedOrigins, SettingsError> {
        let raw = self.ws_origins.as_deref().unwrap_or(DEFAULT_FRONTEND_URL);
        let values = raw.split(',').map(str::trim).filter(|value| !value.is_empty());
        AllowedOrigins::parse(values).map_err(|err| SettingsError::Url {
            name: "ws_origins",
            message: err.to_string(),
        })
    }

    fn rate_limit(&self) -> Result<RateLimitConfig, SettingsError> {
        let defaults = RateLimitConfig::default();
        let max_attempts = self.rate_limit_attempts.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(SettingsError::NonPositive {
                name: "rate_limit_attempts",
            });
        }
        let window = self
            .rate_limit_window_secs
            .map_or(defaults.window, Duration::from_secs);
        if window.is_zero() {
            return Err(SettingsError::NonPositive {
                name: "rate_limit_window_secs",
            });
        }
        Ok(RateLimitConfig {
            max_attempts,
            window,
        })
    }

    fn cloudinary(&self) -> Option<CloudinaryConfig> {
        match (
            non_empty(self.cloudinary_cloud_name.as_deref()),
            non_empty(self.cloudinary_api_key.as_deref()),
            non_empty(self.cloudinary_api_secret.as_deref()),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name: cloud_name.to_owned(),
                api_key: api_key.to_owned(),
                api_secret: Zeroizing::new(api_secret.to_owned()),
                timeout: OUTBOUND_TIMEOUT,
            }),
            _ => None,
        }
    }

    fn mailer(&self) -> Result<Option<HttpMailerConfig>, SettingsError> {
        let (Some(url), Some(api_key)) = (
            non_empty(self.mail_api_url.as_deref()),
            non_empty(self.mail_api_key.as_deref()),
        ) else {
            return Ok(None);
        };
        let endpoint = Url::parse(url).map_err(|err| SettingsError::Url {
            name: "mail_api_url",
            message: err.to_string(),
        })?;
        Ok(Some(HttpMailerConfig {
            endpoint,
            api_key: Zeroizing::new(api_key.to_owned()),
            from: self
                .mail_from
                .clone()
                .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_owned()),
            timeout: OUTBOUND_TIMEOUT,
        }))
    }

    fn jwt_secret(&self) -> Result<Option<Zeroizing<String>>, SettingsError> {
        match non_empty(self.jwt_secret.as_deref()) {
            Some(secret) => Ok(Some(Zeroizing::new(secret.to_owned()))),
            None if cfg!(debug_assertions) => Ok(None),
            None => Err(SettingsError::MissingJwtSecret),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn positive_hours(hours: i64, name: &'static str) -> Result<TimeDelta, SettingsError> {
    if hours <= 0 {
        return Err(SettingsError::NonPositive { name });
    }
    TimeDelta::try_hours(hours).ok_or(SettingsError::NonPositive { name })
}

/// Everything the server needs to build its adapters.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    /// `None` selects the development signing secret.
    pub(crate) jwt_secret: Option<Zeroizing<String>>,
    pub(crate) jwt_ttl: TimeDelta,
    pub(crate) auth: AuthSettings,
    pub(crate) origins: AllowedOrigins,
    pub(crate) rate_limit: RateLimitConfig,
    pub(crate) cloudinary: Option<CloudinaryConfig>,
    pub(crate) mailer: Option<HttpMailerConfig>,
}

impl ServerConfig {
    /// Validate `settings` into a server configuration without a database.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            db_pool: None,
            jwt_secret: settings.jwt_secret()?,
            jwt_ttl: settings.jwt_ttl()?,
            auth: settings.auth_settings()?,
            origins: settings.origins()?,
            rate_limit: settings.rate_limit()?,
            cloudinary: settings.cloudinary(),
            mailer: settings.mailer()?,
        })
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
