use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// NullCache stores nothing. Used when caching is disabled, so every lookup
/// falls through to the authoritative store.
#[derive(Clone, Debug, Default)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        NullCache
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        _key: &str,
        _value: &T,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        _key: &str,
    ) -> Result<Option<T>, CacheError> {
        Ok(None)
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scope;

    #[tokio::test]
    async fn test_null_cache_operations() {
        let cache = NullCache::new();
        let scope = Scope::new("read", "Read");

        assert!(cache.set("oauth_scope:1:read", &scope).await.is_ok());

        let result: Option<Scope> = cache.get("oauth_scope:1:read").await.unwrap();
        assert!(result.is_none());

        assert!(cache.delete("oauth_scope:1:read").await.is_ok());
        assert!(cache.health_check().await.is_ok());
    }
}
