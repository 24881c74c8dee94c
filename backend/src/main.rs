//! Backend entry-point: loads settings, prepares storage and serves the
//! REST API, the `/ws` match feed and the OpenAPI docs.

mod server;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pitchside::outbound::persistence::{DbPool, run_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let mut config = ServerConfig::from_settings(&settings).map_err(std::io::Error::other)?;

    if let Some(pool_config) = settings.pool_config().map_err(std::io::Error::other)? {
        run_migrations(pool_config.database_url())
            .await
            .map_err(std::io::Error::other)?;
        info!(max_connections = pool_config.max_size(), "database migrations applied");
        let pool = DbPool::new(pool_config)
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let server = create_server(config)?;
    info!("pitchside backend listening");
    server.await
}
