//! Services module
//!
//! This module contains business logic services

pub mod actions;
pub mod auth;
pub mod cache;
pub mod queries;
pub mod redis;

// Re-export commonly used services
pub use actions::ActionContext;
pub use auth::{AuthContext, AuthService, Permission};
pub use cache::{cached, revalidate_paths, CacheEntry, MemoryPageCache, NoopPageCache, PageCache};
pub use redis::RedisPageCache;

use std::sync::Arc;

use tracing::info;

use crate::backend::{Backend, BackendHandle, PgBackend, RestBackend, Session};
use crate::config::settings::{BackendMode, Settings};
use crate::database::connection::{self, DatabaseConfig, DatabasePool};
use crate::database::DatabaseService;
use crate::middleware::RateLimitMiddleware;
use crate::utils::errors::{DashboardError, Result};
use crate::views::Presenter;

/// Shared state of the HTTP server
pub type AppState = Arc<ServiceFactory>;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub settings: Settings,
    pub backend: Arc<dyn Backend>,
    pub cache: Arc<dyn PageCache>,
    pub auth_service: AuthService,
    pub presenter: Presenter,
    pub rate_limiter: RateLimitMiddleware,
    pool: Option<DatabasePool>,
    redis: Option<RedisPageCache>,
}

impl ServiceFactory {
    /// Assemble services around an existing backend and cache
    pub fn new(settings: Settings, backend: Arc<dyn Backend>, cache: Arc<dyn PageCache>) -> Self {
        Self {
            auth_service: AuthService::new(settings.clone()),
            presenter: Presenter::new(&settings.app),
            rate_limiter: RateLimitMiddleware::new(&settings.features),
            settings,
            backend,
            cache,
            pool: None,
            redis: None,
        }
    }

    /// Connect the configured backend and page cache
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let (backend, pool): (Arc<dyn Backend>, Option<DatabasePool>) = match settings.backend.mode {
            BackendMode::Rest => {
                info!(url = %settings.backend.url, "Using REST backend");
                (Arc::new(RestBackend::new(&settings.backend)?), None)
            }
            BackendMode::Postgres => {
                info!("Connecting to backend database...");
                let pool = connection::create_pool(&DatabaseConfig::from_backend(&settings.backend)?).await?;
                if settings.backend.run_migrations {
                    connection::run_migrations(&pool).await?;
                }
                let secret = settings
                    .backend
                    .jwt_secret
                    .as_deref()
                    .ok_or_else(|| DashboardError::Config("backend.jwt_secret is not set".to_string()))?;
                (Arc::new(PgBackend::new(pool.clone(), secret)), Some(pool))
            }
        };

        let mut redis = None;
        let cache: Arc<dyn PageCache> = if !settings.features.page_cache {
            Arc::new(NoopPageCache)
        } else if settings.cache.backend == "redis" {
            let page_cache = RedisPageCache::new(&settings.cache)?;
            redis = Some(page_cache.clone());
            Arc::new(page_cache)
        } else {
            Arc::new(MemoryPageCache::new(settings.cache.ttl_seconds))
        };
        info!(backend = backend.name(), cache = cache.name(), "Services initialized");

        let mut factory = Self::new(settings, backend, cache);
        factory.pool = pool;
        factory.redis = redis;
        Ok(factory)
    }

    /// Repositories bound to `session`
    pub fn database(&self, session: Session) -> DatabaseService {
        DatabaseService::new(BackendHandle::new(self.backend.clone(), session))
    }

    /// Everything a mutation action needs for `session`
    pub fn action_context(&self, session: Session) -> ActionContext {
        ActionContext::new(
            self.database(session),
            self.auth_service.clone(),
            self.cache.clone(),
            self.presenter.offset(),
        )
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = match &self.pool {
            Some(pool) => Some(connection::health_check(pool).await.is_ok()),
            None => None,
        };
        let redis_healthy = match &self.redis {
            Some(redis) => Some(redis.health_check().await),
            None => None,
        };

        ServiceHealthStatus {
            backend: self.backend.name(),
            cache: self.cache.name(),
            database_healthy,
            redis_healthy,
        }
    }
}

/// Health status for all services
///
/// `None` means the component is not configured.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub backend: &'static str,
    pub cache: &'static str,
    pub database_healthy: Option<bool>,
    pub redis_healthy: Option<bool>,
}

impl ServiceHealthStatus {
    /// Check if all configured components respond
    pub fn is_healthy(&self) -> bool {
        self.database_healthy.unwrap_or(true) && self.redis_healthy.unwrap_or(true)
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.database_healthy == Some(false) {
            issues.push("Database connection failed".to_string());
        }
        if self.redis_healthy == Some(false) {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}
