pub use crate::config::cache::{CacheConfig, CacheStore, InMemoryCacheConfig, RedisCacheConfig};
pub use crate::config::validator::ValidatorConfig;
use confique::Config;

pub mod cache;
pub mod validator;

/// Main configuration structure for the scope service
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// Cache configuration
    #[config(nested)]
    pub cache: CacheConfig,

    /// Scope registry configuration
    #[config(nested)]
    pub registry: RegistryConfig,

    /// Scope validator configuration
    #[config(nested)]
    pub validator: ValidatorConfig,
}

impl Settings {
    /// Creates a new Settings instance from `SCOPES_*` environment variables
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().load()
    }

    /// Settings with every field at its default, ignoring the environment
    pub fn defaults() -> Result<Self, confique::Error> {
        Self::builder().load()
    }
}

/// Configuration for the scope registry
#[derive(Debug, Config, Clone)]
pub struct RegistryConfig {
    /// Page size used when a listing request has no count or a negative one (default: 30)
    #[config(env = "SCOPES_REGISTRY_MAX_FILTER_COUNT", default = 30)]
    pub max_filter_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.cache.ttl_secs, 900);
        assert_eq!(settings.cache.store, CacheStore::InMemory);
        assert_eq!(settings.cache.in_memory.capacity_mib, 64);
        assert_eq!(settings.cache.redis.url, "");
        assert_eq!(settings.registry.max_filter_count, 30);
        assert!(!settings.validator.check_roles_from_saml_assertion);
        assert!(!settings.validator.log_access_tokens);
    }

    #[test]
    fn test_settings_from_env() {
        std::env::set_var("SCOPES_CACHE_STORE", "redis");
        std::env::set_var("SCOPES_CACHE_REDIS_URL", "redis://localhost:6379");
        std::env::set_var("SCOPES_REGISTRY_MAX_FILTER_COUNT", "100");
        std::env::set_var("SCOPES_VALIDATOR_CHECK_ROLES_FROM_SAML_ASSERTION", "true");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.cache.store, CacheStore::Redis);
        assert_eq!(settings.cache.redis.url, "redis://localhost:6379");
        assert_eq!(settings.registry.max_filter_count, 100);
        assert!(settings.validator.check_roles_from_saml_assertion);

        std::env::remove_var("SCOPES_CACHE_STORE");
        std::env::remove_var("SCOPES_CACHE_REDIS_URL");
        std::env::remove_var("SCOPES_REGISTRY_MAX_FILTER_COUNT");
        std::env::remove_var("SCOPES_VALIDATOR_CHECK_ROLES_FROM_SAML_ASSERTION");
    }
}
