//! Backend entry-point: loads configuration, prepares storage and serves the
//! marketplace API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pet_adoption::inbound::http::health::HealthState;
use pet_adoption::inbound::http::session_config::{
    BuildMode, CookieSettings, SessionConfigError, cookie_settings_from_env,
};
use pet_adoption::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{AppSettings, ServerConfig, create_server};

/// Cookie settings from the process environment.
fn process_cookie_settings(mode: BuildMode) -> Result<CookieSettings, SessionConfigError> {
    cookie_settings_from_env(&DefaultEnv::new(), mode)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load configuration: {e}")))?;
    let cookies =
        process_cookie_settings(BuildMode::from_debug_assertions()).map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let admin_email = settings.admin_email().map_err(io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr, cookies, settings.uploads_dir(), admin_email);

    match settings.database_url.as_deref() {
        Some(url) => {
            let applied = run_pending_migrations(url).await.map_err(io::Error::other)?;
            info!(applied, "database migrations applied");
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
                .await
                .map_err(|e| io::Error::other(e.into_message()))?;
            config = config.with_db_pool(pool);
        }
        None => warn!("ADOPTION_DATABASE_URL is not set"),
    }

    if settings.seed_example_data {
        match settings.admin_password.clone() {
            Some(password) => config = config.with_example_data(password),
            None => warn!("example data requested but ADOPTION_ADMIN_PASSWORD is not set"),
        }
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config).await?.await
}
