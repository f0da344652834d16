use confique::Config;
use serde::Deserialize;

/// Specifies which cache store implementation to use
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStore {
    #[default]
    InMemory,
    Redis,
    #[serde(other)]
    None,
}

/// Configuration for the caching subsystem
#[derive(Debug, Config, Clone)]
pub struct CacheConfig {
    /// Cache TTL in seconds (default: 15 minutes)
    #[config(env = "SCOPES_CACHE_TTL_SECS", default = 900)]
    pub ttl_secs: u64,

    /// Cache store type: "in-memory" (default), "redis" or "none"
    #[config(env = "SCOPES_CACHE_STORE", default = "in-memory")]
    pub store: CacheStore,

    /// In-memory cache specific configuration
    #[config(nested)]
    pub in_memory: InMemoryCacheConfig,

    /// Redis cache specific configuration
    #[config(nested)]
    pub redis: RedisCacheConfig,
}

/// In-memory cache configuration options
#[derive(Debug, Config, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum capacity in MiB (default: 64 MiB)
    #[config(env = "SCOPES_CACHE_IN_MEMORY_CAPACITY_MIB", default = 64)]
    pub capacity_mib: usize,
}

/// Redis cache configuration options
#[derive(Debug, Config, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection string
    #[config(env = "SCOPES_CACHE_REDIS_URL", default = "")]
    pub url: String,
}
