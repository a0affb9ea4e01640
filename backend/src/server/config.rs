//! Process settings read from the environment and the server configuration
//! object assembled from them.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use parcel_backend::outbound::analysis::{AnalysisHttpBackend, DEFAULT_ANALYSIS_TIMEOUT};
use parcel_backend::outbound::persistence::{DEFAULT_POOL_MAX_SIZE, DbPool};
use url::Url;

pub(crate) const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub(crate) const BIND_ADDR_ENV: &str = "BIND_ADDR";
pub(crate) const BACKEND_URL_ENV: &str = "INTERNAL_BACKEND_URL";
pub(crate) const PROXY_TIMEOUT_ENV: &str = "PROXY_TIMEOUT_SECS";
pub(crate) const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub(crate) const POOL_MAX_SIZE_ENV: &str = "DB_POOL_MAX_SIZE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Failures while reading process settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable holds an unparsable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Non-session process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Base URL of the analysis service.
    pub backend_url: Url,
    /// Upper bound for one proxied request.
    pub proxy_timeout: Duration,
    /// Default tracing filter directive.
    pub log_level: String,
    /// Maximum pooled database connections.
    pub pool_max_size: u32,
}

impl AppSettings {
    /// Read settings, applying defaults for everything except the database
    /// URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is missing or any variable
    /// fails to parse.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let database_url = non_blank(env, DATABASE_URL_ENV).ok_or(ConfigError::MissingEnv {
            name: DATABASE_URL_ENV,
        })?;
        let bind_addr = parse_or(env, BIND_ADDR_ENV, DEFAULT_BIND_ADDR, "host:port")?;
        let backend_url = parse_backend_url(env)?;
        let timeout_secs = positive(env, PROXY_TIMEOUT_ENV, DEFAULT_ANALYSIS_TIMEOUT.as_secs())?;
        let pool_max_size = positive(env, POOL_MAX_SIZE_ENV, DEFAULT_POOL_MAX_SIZE)?;
        let log_level =
            non_blank(env, LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        Ok(Self {
            database_url,
            bind_addr,
            backend_url,
            proxy_timeout: Duration::from_secs(timeout_secs),
            log_level,
            pool_max_size,
        })
    }
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_or<E: Env, T: std::str::FromStr>(
    env: &E,
    name: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = non_blank(env, name).unwrap_or_else(|| default.to_owned());
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        value,
        expected,
    })
}

fn positive<E: Env, T>(env: &E, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(value) = non_blank(env, name) else {
        return Ok(default);
    };
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidEnv {
            name,
            value,
            expected: "positive integer",
        }),
    }
}

fn parse_backend_url<E: Env>(env: &E) -> Result<Url, ConfigError> {
    let value = non_blank(env, BACKEND_URL_ENV).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::InvalidEnv {
            name: BACKEND_URL_ENV,
            value,
            expected: "absolute http(s) URL",
        }),
    }
}

/// Everything [`super::create_server`] needs to start listening.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) analysis: AnalysisHttpBackend,
}

impl ServerConfig {
    /// Construct a server configuration from session preferences and the
    /// outbound adapters.
    #[must_use]
    pub const fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        analysis: AnalysisHttpBackend,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            analysis,
        }
    }
}
