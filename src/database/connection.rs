//! Postgres pool for the direct-database backend mode

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::config::BackendConfig;
use crate::utils::errors::DashboardError;

pub type DatabasePool = Pool<Postgres>;

/// Idle connections are recycled after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Pool settings for `postgres` backend mode
    pub fn from_backend(config: &BackendConfig) -> Result<Self, DashboardError> {
        let url = config
            .database_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| DashboardError::Config("backend.database_url is not set".to_string()))?;

        Ok(Self {
            url,
            max_connections: config.max_connections,
            min_connections: config.min_connections.min(config.max_connections),
            acquire_timeout: Duration::from_secs(config.timeout_seconds),
        })
    }
}

/// Connect to the backend database and verify the connection
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DashboardError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;
    info!(max_connections = config.max_connections, "Backend database pool ready");
    Ok(pool)
}

/// Apply the bundled schema migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DashboardError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Schema migrations applied");
    Ok(())
}

pub async fn health_check(pool: &DatabasePool) -> Result<(), DashboardError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
