//! Typed cache namespaces sharing one [`Cache`] backend.
//!
//! Each namespace owns its key prefix and value type, so a value read back is
//! always of the shape its namespace wrote. All operations are best effort: a
//! backend fault is logged and reported as a miss, because the stores stay
//! authoritative.

use super::{Cache, CacheBackend};
use crate::models::{ResourceScopeBinding, Scope, TenantId};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

async fn cache_get<T: DeserializeOwned + Send + Sync>(cache: &Cache, key: &str) -> Option<T> {
    match cache.get::<T>(key).await {
        Ok(Some(value)) => {
            debug!("Cache hit for key: {}", key);
            Some(value)
        }
        Ok(None) => {
            debug!("Cache miss for key: {}", key);
            None
        }
        Err(cache_err) => {
            warn!("Cache error for key {}: {}", key, cache_err);
            None
        }
    }
}

async fn cache_set<T: Serialize + Send + Sync>(cache: &Cache, key: &str, value: &T) {
    if let Err(cache_err) = cache.set(key, value).await {
        warn!("Failed to cache value for {}: {}", key, cache_err);
    }
}

async fn cache_delete(cache: &Cache, key: &str) {
    if let Err(cache_err) = cache.delete(key).await {
        warn!("Failed to evict cache entry {}: {}", key, cache_err);
    }
}

/// Scope definitions by tenant and name
#[derive(Clone)]
pub struct ScopeCache {
    cache: Cache,
}

impl ScopeCache {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    fn key(name: &str, tenant_id: TenantId) -> String {
        format!("oauth_scope:{tenant_id}:{name}")
    }

    pub async fn get(&self, name: &str, tenant_id: TenantId) -> Option<Scope> {
        cache_get(&self.cache, &Self::key(name, tenant_id)).await
    }

    pub async fn put(&self, scope: &Scope, tenant_id: TenantId) {
        cache_set(&self.cache, &Self::key(&scope.name, tenant_id), scope).await
    }

    pub async fn evict(&self, name: &str, tenant_id: TenantId) {
        cache_delete(&self.cache, &Self::key(name, tenant_id)).await
    }
}

/// Cached answer to "which scope protects this resource".
///
/// An entry without a scope records that the resource is unprotected, so
/// repeated requests for it do not reach the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ResourceScopeEntry {
    pub scope: Option<String>,
    pub tenant_id: Option<TenantId>,
}

impl From<Option<ResourceScopeBinding>> for ResourceScopeEntry {
    fn from(binding: Option<ResourceScopeBinding>) -> Self {
        match binding {
            Some(binding) => Self {
                scope: Some(binding.scope),
                tenant_id: Some(binding.tenant_id),
            },
            None => Self::default(),
        }
    }
}

/// Resource to required scope bindings, keyed by a digest of the resource
/// identifier (resources are arbitrary strings such as `GET /api/orders/*`)
#[derive(Clone)]
pub struct ResourceScopeCache {
    cache: Cache,
}

impl ResourceScopeCache {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    fn key(resource: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(resource.as_bytes());
        format!("resource_scope:{:x}", hasher.finalize())
    }

    pub async fn get(&self, resource: &str) -> Option<ResourceScopeEntry> {
        cache_get(&self.cache, &Self::key(resource)).await
    }

    pub async fn put(&self, resource: &str, entry: &ResourceScopeEntry) {
        cache_set(&self.cache, &Self::key(resource), entry).await
    }

    pub async fn evict(&self, resource: &str) {
        cache_delete(&self.cache, &Self::key(resource)).await
    }
}

/// OIDC claim to scope mapping per tenant. It is filled by the OIDC layer; the
/// registry only drops it when scope bindings change.
#[derive(Clone)]
pub struct ScopeClaimCache {
    cache: Cache,
}

impl ScopeClaimCache {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    pub fn key(tenant_id: TenantId) -> String {
        format!("oidc_scope_claims:{tenant_id}")
    }

    pub async fn clear_scope_claim_map(&self, tenant_id: TenantId) {
        cache_delete(&self.cache, &Self::key(tenant_id)).await
    }
}
