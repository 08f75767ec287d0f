//! Aggregation response caching
//!
//! Report responses are cached in-process as JSON, keyed by tenant, endpoint
//! path, integration ids and the filter's semantic hash.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;

/// Cache entry with expiration tracking
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Generic cache storage with TTL support
#[derive(Debug)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    max_entries: usize,
    default_ttl: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            default_ttl,
        }
    }

    /// Get a value from cache if it exists and is not expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.data.clone())
    }

    /// Set a value in cache with default TTL
    pub async fn set(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;

        if entries.len() >= self.max_entries {
            Self::evict_expired_locked(&mut entries);
        }

        // Still full: drop the oldest entry
        if entries.len() >= self.max_entries {
            if let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest_key);
            }
        }

        entries.insert(key, CacheEntry::new(value, self.default_ttl));
    }

    /// Remove all expired entries
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        Self::evict_expired_locked(&mut entries)
    }

    fn evict_expired_locked(entries: &mut HashMap<K, CacheEntry<V>>) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let total = entries.len();
        let expired = entries.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            valid_entries: total - expired,
            max_entries: self.max_entries,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
    pub max_entries: usize,
}

/// Cache key for one aggregation call
pub fn cache_key(tenant: &str, path: &str, integration_ids: &[String], filter_hash: &str) -> String {
    let mut ids = integration_ids.to_vec();
    ids.sort();
    let mut hasher = Sha256::new();
    hasher.update(tenant.as_bytes());
    hasher.update(b"\n");
    hasher.update(path.as_bytes());
    hasher.update(b"\n");
    hasher.update(ids.join(",").as_bytes());
    hasher.update(b"\n");
    hasher.update(filter_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache-or-call wrapper around aggregation collaborators
#[derive(Clone)]
pub struct AggregationCache {
    enabled: bool,
    entries: Arc<Cache<String, Value>>,
}

impl AggregationCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            entries: Arc::new(Cache::new(
                config.max_entries,
                Duration::from_secs(config.ttl_secs),
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the cached value or run `call` and store its result
    ///
    /// `disable` skips the lookup only; the fresh value is still stored.
    pub async fn cache_or_call<T, F, Fut>(
        &self,
        disable: bool,
        tenant: &str,
        path: &str,
        filter_hash: &str,
        integration_ids: &[String],
        call: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.enabled {
            return call().await;
        }

        let key = cache_key(tenant, path, integration_ids, filter_hash);
        if !disable {
            if let Some(cached) = self.entries.get(&key).await {
                match serde_json::from_value(cached) {
                    Ok(value) => {
                        debug!("Cache hit: {} for tenant {}", path, tenant);
                        return Ok(value);
                    }
                    Err(e) => warn!("Discarding unreadable cache entry for {}: {}", path, e),
                }
            }
        }

        debug!("Cache miss: {} for tenant {}", path, tenant);
        let fresh = call().await?;
        match serde_json::to_value(&fresh) {
            Ok(value) => self.entries.set(key, value).await,
            Err(e) => warn!("Failed to cache response for {}: {}", path, e),
        }
        Ok(fresh)
    }

    pub async fn evict_expired(&self) -> usize {
        self.entries.evict_expired().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.stats().await
    }
}

/// Background job evicting expired entries
pub struct CacheEvictionJob {
    cache: AggregationCache,
    interval: Duration,
}

impl CacheEvictionJob {
    pub fn new(cache: AggregationCache, interval_secs: u64) -> Self {
        Self {
            cache,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("Starting cache eviction job with interval {:?}", self.interval);
            let mut interval = tokio::time::interval(self.interval);
            loop {
                interval.tick().await;
                let evicted = self.cache.evict_expired().await;
                if evicted > 0 {
                    debug!("Cache eviction: removed {} expired entries", evicted);
                }
            }
        })
    }
}
