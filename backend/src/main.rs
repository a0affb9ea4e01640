//! Backend entry-point: reads configuration, applies migrations, and serves
//! the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use parcel_backend::inbound::http::health::HealthState;
use parcel_backend::inbound::http::session_config::fingerprint::key_fingerprint;
use parcel_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use parcel_backend::outbound::analysis::AnalysisHttpBackend;
use parcel_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let env = DefaultEnv::new();
    let settings = AppSettings::from_env(&env).map_err(std::io::Error::other)?;
    init_tracing(&settings.log_level);

    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    run_pending_migrations(&settings.database_url)
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(
        PoolConfig::new(settings.database_url.as_str()).with_max_size(settings.pool_max_size),
    )
    .await
    .map_err(std::io::Error::other)?;
    let analysis = AnalysisHttpBackend::new(settings.backend_url.clone(), settings.proxy_timeout)
        .map_err(std::io::Error::other)?;

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr,
        pool,
        analysis,
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(
        bind_addr = %settings.bind_addr,
        analysis_backend = %settings.backend_url,
        "server listening"
    );
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}
