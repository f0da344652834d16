use crate::config::{CacheConfig, CacheStore};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod memory;
pub mod namespaces;
pub mod null;
pub mod redis;

pub use namespaces::{ResourceScopeCache, ResourceScopeEntry, ScopeCache, ScopeClaimCache};

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse value: {0}")]
    Deserialization(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Cache trait defining the interface for all cache implementations.
///
/// Keys are plain strings; callers qualify them with a namespace and, where the
/// value is tenant partitioned, the tenant. Values are stored as JSON.
///
/// Implementations must be thread-safe and cheap to clone, since one backend is
/// shared by the registry and the validator.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Store a value in the cache with the configured TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T)
        -> Result<(), CacheError>;

    /// Retrieve a value from the cache
    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError>;

    /// Checks that the backend is reachable. For Redis this pings the server.
    async fn health_check(&self) -> Result<(), String>;

    /// Delete a value from the cache
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache implementation that provides a uniform interface regardless of backend.
///
/// The concrete backend is chosen at runtime from [`CacheConfig::store`].
#[derive(Clone)]
pub enum Cache {
    /// In-memory cache implementation using Moka
    InMemory(memory::InMemoryCache),
    /// Redis-based cache implementation
    Redis(redis::RedisCache),
    /// No-op cache, every lookup is a miss
    Null(null::NullCache),
}

#[async_trait::async_trait]
impl CacheBackend for Cache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        match self {
            Self::InMemory(cache) => cache.set(key, value).await,
            Self::Redis(cache) => cache.set(key, value).await,
            Self::Null(cache) => cache.set(key, value).await,
        }
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match self {
            Self::InMemory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
            Self::Null(cache) => cache.get(key).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::InMemory(cache) => cache.health_check().await,
            Self::Redis(cache) => cache.health_check().await,
            Self::Null(cache) => cache.health_check().await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            Self::InMemory(cache) => cache.delete(key).await,
            Self::Redis(cache) => cache.delete(key).await,
            Self::Null(cache) => cache.delete(key).await,
        }
    }
}

/// Creates the cache backend selected by the configuration.
///
/// Fails when the configuration is unusable (e.g. Redis without a URL) or the
/// backend cannot be reached at startup.
pub async fn create_cache(config: &CacheConfig) -> Result<Cache, CacheError> {
    match config.store {
        CacheStore::InMemory => {
            let cache = memory::InMemoryCache::new(config.ttl_secs, config.in_memory.capacity_mib)
                .map_err(CacheError::Config)?;
            Ok(Cache::InMemory(cache))
        }
        CacheStore::Redis => {
            if config.redis.url.is_empty() {
                return Err(CacheError::Config(
                    "Redis URL is required for Redis cache".to_string(),
                ));
            }
            let cache = redis::RedisCache::new(&config.redis.url, config.ttl_secs)
                .await
                .map_err(CacheError::Config)?;
            Ok(Cache::Redis(cache))
        }
        CacheStore::None => Ok(Cache::Null(null::NullCache::new())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{InMemoryCacheConfig, RedisCacheConfig};
    use crate::models::Scope;

    fn cache_config(store: CacheStore) -> CacheConfig {
        CacheConfig {
            ttl_secs: 60,
            store,
            in_memory: InMemoryCacheConfig { capacity_mib: 16 },
            redis: RedisCacheConfig {
                url: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_create_in_memory_cache() {
        let cache = create_cache(&cache_config(CacheStore::InMemory))
            .await
            .expect("Failed to create cache");
        assert!(matches!(cache, Cache::InMemory(_)));

        let scope = Scope::new("read", "Read");
        cache.set("oauth_scope:1:read", &scope).await.unwrap();
        let value: Option<Scope> = cache.get("oauth_scope:1:read").await.unwrap();
        assert_eq!(value, Some(scope));

        cache.delete("oauth_scope:1:read").await.unwrap();
        let value: Option<Scope> = cache.get("oauth_scope:1:read").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_create_null_cache() {
        let cache = create_cache(&cache_config(CacheStore::None)).await.unwrap();
        assert!(matches!(cache, Cache::Null(_)));
        assert!(cache.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_redis_cache_requires_url() {
        let result = create_cache(&cache_config(CacheStore::Redis)).await;
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[tokio::test]
    async fn test_cache_concurrent_operations() {
        let cache = create_cache(&cache_config(CacheStore::InMemory)).await.unwrap();
        let cache_clone = cache.clone();

        let set_task = tokio::spawn(async move {
            for i in 0..100 {
                let scope = Scope::new(format!("scope_{i}"), format!("Scope {i}"));
                cache_clone
                    .set(&format!("oauth_scope:1:scope_{i}"), &scope)
                    .await
                    .expect("Failed to set value");
            }
        });

        let get_task = tokio::spawn(async move {
            for i in 0..100 {
                if let Ok(Some(scope)) = cache.get::<Scope>(&format!("oauth_scope:1:scope_{i}")).await {
                    assert_eq!(scope.name, format!("scope_{i}"));
                }
            }
        });

        tokio::try_join!(set_task, get_task).expect("Tasks failed");
    }
}
