//! Page cache and path revalidation
//!
//! Pages cache their shared list payloads under their path. Every successful
//! mutation marks a fixed set of paths stale, and the next request for one of
//! them reads through to the backend again.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::utils::logging::log_revalidation;

/// Cache entry with TTL information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub ttl_seconds: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl_seconds: u64) -> Self {
        Self {
            data,
            created_at: Utc::now(),
            ttl_seconds,
        }
    }

    pub fn is_expired(&self) -> bool {
        let age = Utc::now().signed_duration_since(self.created_at);
        age.num_seconds() >= self.ttl_seconds as i64
    }
}

/// Storage for per-path page payloads
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, path: &str) -> Option<Value>;

    async fn put(&self, path: &str, payload: Value);

    /// Drop the payload of `path`; returns whether anything was cached
    async fn invalidate(&self, path: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Mark every path stale
pub async fn revalidate_paths(cache: &dyn PageCache, paths: &[&str]) {
    for path in paths {
        let removed = cache.invalidate(path).await;
        log_revalidation(path, removed);
    }
}

/// Read `path` through the cache
///
/// Only successful fetches are stored; a `None` from `fetch` is returned
/// as is and retried on the next request.
pub async fn cached<T, F, Fut>(cache: &dyn PageCache, path: &str, fetch: F) -> Option<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    if let Some(payload) = cache.get(path).await {
        match serde_json::from_value(payload) {
            Ok(value) => return Some(value),
            Err(e) => warn!(path = path, error = %e, "Discarding unreadable cache entry"),
        }
    }

    let value = fetch().await?;
    match serde_json::to_value(&value) {
        Ok(payload) => cache.put(path, payload).await,
        Err(e) => warn!(path = path, error = %e, "Page payload not cacheable"),
    }
    Some(value)
}

/// In-process cache with a fixed TTL
pub struct MemoryPageCache {
    entries: RwLock<HashMap<String, CacheEntry<Value>>>,
    ttl: Duration,
}

impl MemoryPageCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, path: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        match entries.get(path) {
            Some(entry) if !entry.is_expired() => {
                debug!(path = path, "Page cache hit");
                Some(entry.data.clone())
            }
            _ => None,
        }
    }

    async fn put(&self, path: &str, payload: Value) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());
        entries.insert(path.to_string(), CacheEntry::new(payload, self.ttl.as_secs()));
    }

    async fn invalidate(&self, path: &str) -> bool {
        self.entries.write().await.remove(path).is_some()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Cache that stores nothing, used when the page cache feature is off
pub struct NoopPageCache;

#[async_trait]
impl PageCache for NoopPageCache {
    async fn get(&self, _path: &str) -> Option<Value> {
        None
    }

    async fn put(&self, _path: &str, _payload: Value) {}

    async fn invalidate(&self, _path: &str) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
