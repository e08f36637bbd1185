//! Redis-backed page cache
//!
//! Shares cached page payloads between dashboard instances. Redis failures
//! never fail a request: reads miss and writes are dropped with a warning.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult};
use serde_json::Value;
use tracing::{debug, warn};

use super::cache::PageCache;
use crate::config::CacheConfig;
use crate::utils::errors::{DashboardError, Result};

#[derive(Clone, Debug)]
pub struct RedisPageCache {
    client: Client,
    prefix: String,
    ttl_seconds: u64,
}

impl RedisPageCache {
    /// Create a new RedisPageCache instance
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let url = config
            .redis_url
            .as_deref()
            .ok_or_else(|| DashboardError::Config("cache.redis_url is not set".to_string()))?;
        let client = Client::open(url).map_err(DashboardError::Redis)?;

        Ok(Self {
            client,
            prefix: config.prefix.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    fn key(&self, path: &str) -> String {
        format!("{}page:{}", self.prefix, path)
    }

    async fn get_connection(&self) -> RedisResult<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn try_get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.get_connection().await?;
        let result: Option<String> = conn.get(key).await?;
        match result {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn try_put(&self, key: &str, payload: &Value) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(payload)?;
        let _: () = conn.set_ex(key, serialized, self.ttl_seconds).await?;
        Ok(())
    }

    async fn try_delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let deleted: i32 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> bool {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => response == "PONG",
                    Err(e) => {
                        warn!(error = %e, "Redis health check failed");
                        false
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                false
            }
        }
    }
}

#[async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, path: &str) -> Option<Value> {
        let key = self.key(path);
        match self.try_get(&key).await {
            Ok(value) => {
                debug!(key = %key, hit = value.is_some(), "Page cache lookup");
                value
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Page cache read failed");
                None
            }
        }
    }

    async fn put(&self, path: &str, payload: Value) {
        let key = self.key(path);
        if let Err(e) = self.try_put(&key, &payload).await {
            warn!(key = %key, error = %e, "Page cache write failed");
        }
    }

    async fn invalidate(&self, path: &str) -> bool {
        let key = self.key(path);
        match self.try_delete(&key).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(key = %key, error = %e, "Page cache invalidation failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
