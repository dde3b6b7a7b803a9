use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::error::SearchError;
use crate::core::geo::{GeocodeHit, Geocoder};
use crate::models::Coordinate;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// L1 is an in-process moka cache. L2 is Redis, shared across instances and
/// optional: without it (or when it cannot be reached at startup) the
/// manager runs on L1 alone.
pub struct CacheManager {
    // Store ConnectionManager in a Mutex for interior mutability
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager, falling back to L1 only when Redis is unusable
    pub async fn new(redis_url: Option<&str>, l1_size: u64, ttl_secs: u64) -> Self {
        let mut cache = Self::in_memory(l1_size, ttl_secs);

        if let Some(url) = redis_url {
            match Self::connect(url).await {
                Ok(redis) => {
                    tracing::info!("Geocode cache using Redis L2");
                    cache.redis = Some(Arc::new(tokio::sync::Mutex::new(redis)));
                }
                Err(e) => {
                    tracing::warn!("Redis unavailable, geocode cache is L1 only: {}", e);
                }
            }
        }

        cache
    }

    /// L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    async fn connect(redis_url: &str) -> Result<ConnectionManager, CacheError> {
        let client = redis::Client::open(redis_url)?;
        Ok(redis::aio::ConnectionManager::new(client).await?)
    }

    pub fn has_l2(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        // Try L1 cache first
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                // Populate L1 cache
                let bytes = json.as_bytes().to_vec();
                self.l1_cache.insert(key.to_string(), bytes).await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in every available tier
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        // Set in L1 cache (uses configured TTL)
        let bytes = json.as_bytes().to_vec();
        self.l1_cache.insert(key.to_string(), bytes).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from every available tier
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let _: () = redis::cmd("DEL")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Forward lookup key, case and whitespace insensitive
    pub fn geocode_forward(query: &str) -> String {
        let normalized = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        format!("geo:fwd:{}", normalized)
    }

    /// Reverse lookup key, rounded to roughly a metre
    pub fn geocode_reverse(coordinate: Coordinate) -> String {
        format!("geo:rev:{:.5},{:.5}", coordinate.latitude, coordinate.longitude)
    }
}

/// Caching wrapper around any [`Geocoder`]
///
/// Only positive answers are cached; empty results and failures always go
/// back to the wrapped geocoder. Cache errors are logged and treated as
/// misses.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Arc<CacheManager>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }

    async fn lookup<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(value) => Some(value),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Geocode cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!("Geocode cache write failed for {}: {}", key, e);
        }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn forward(&self, query: &str) -> Result<Vec<GeocodeHit>, SearchError> {
        let key = CacheKey::geocode_forward(query);
        if let Some(hits) = self.lookup::<Vec<GeocodeHit>>(&key).await {
            return Ok(hits);
        }

        let hits = self.inner.forward(query).await?;
        if !hits.is_empty() {
            self.store(&key, &hits).await;
        }
        Ok(hits)
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, SearchError> {
        let key = CacheKey::geocode_reverse(coordinate);
        if let Some(label) = self.lookup::<String>(&key).await {
            return Ok(Some(label));
        }

        let label = self.inner.reverse(coordinate).await?;
        if let Some(label) = &label {
            self.store(&key, label).await;
        }
        Ok(label)
    }
}
