use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared `core_config`/
/// `database` building blocks the way `apps/zerg/api/src/config.rs` does.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Shared-secret credential checked against `X-API-Key` on every
    /// request; empty disables the check (local dev only).
    pub api_key: String,
    pub cache_ttl_seconds: i64,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let redis = RedisConfig::from_env()?;

        let api_key = std::env::var("API_KEY")
            .or_else(|_| std::env::var("ARGUS_API_KEY"))
            .unwrap_or_default();
        let cache_ttl_seconds = std::env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(43_200);

        Ok(Self {
            app: app_info!(),
            database,
            redis,
            server,
            environment,
            api_key,
            cache_ttl_seconds,
        })
    }
}
