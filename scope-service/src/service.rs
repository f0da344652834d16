use crate::cache::{
    create_cache, Cache, CacheBackend, CacheError, ResourceScopeCache, ScopeCache, ScopeClaimCache,
};
use crate::config::Settings;
use crate::consent::ConsentManager;
use crate::registry::ScopeRegistry;
use crate::roles::RoleProvider;
use crate::store::{ConsentStore, ScopeStore};
use crate::validator::RoleBasedScopeValidator;
use log::info;
use std::sync::Arc;

/// The scope subsystem wired together: one cache backend shared by every
/// cache namespace, the authoritative stores and the role provider.
#[derive(Clone)]
pub struct ScopeService {
    pub settings: Arc<Settings>,
    pub cache: Arc<Cache>,
    pub registry: Arc<ScopeRegistry>,
    pub consents: Arc<ConsentManager>,
    pub validator: Arc<RoleBasedScopeValidator>,
}

impl ScopeService {
    /// Builds the service with the cache backend selected by `settings`
    pub async fn new(
        settings: Settings,
        scope_store: Arc<dyn ScopeStore>,
        consent_store: Arc<dyn ConsentStore>,
        roles: Arc<dyn RoleProvider>,
    ) -> Result<Self, CacheError> {
        let cache = create_cache(&settings.cache).await?;
        info!("Using {:?} cache store", settings.cache.store);
        Ok(Self::with_existing_cache(
            settings,
            cache,
            scope_store,
            consent_store,
            roles,
        ))
    }

    /// Builds the service on an already created cache backend
    pub fn with_existing_cache(
        settings: Settings,
        cache: Cache,
        scope_store: Arc<dyn ScopeStore>,
        consent_store: Arc<dyn ConsentStore>,
        roles: Arc<dyn RoleProvider>,
    ) -> Self {
        let scope_cache = ScopeCache::new(cache.clone());
        let registry = ScopeRegistry::new(
            Arc::clone(&scope_store),
            scope_cache.clone(),
            ScopeClaimCache::new(cache.clone()),
            &settings.registry,
        );
        let validator = RoleBasedScopeValidator::new(
            scope_store,
            ResourceScopeCache::new(cache.clone()),
            scope_cache,
            roles,
            &settings.validator,
        );

        Self {
            settings: Arc::new(settings),
            cache: Arc::new(cache),
            registry: Arc::new(registry),
            consents: Arc::new(ConsentManager::new(consent_store)),
            validator: Arc::new(validator),
        }
    }

    /// Checks the cache backend is reachable
    pub async fn health_check(&self) -> Result<(), String> {
        self.cache.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheStore;
    use crate::models::{AccessToken, AuthenticatedUser, Scope};
    use crate::roles::InMemoryRoleProvider;
    use crate::store::memory::{InMemoryConsentStore, InMemoryScopeStore};
    use crate::test_utils::setup_logger;
    use crate::validator::{AllowReason, Decision, ScopeValidator};

    async fn service(settings: Settings) -> (ScopeService, Arc<InMemoryScopeStore>) {
        setup_logger();
        let store = Arc::new(InMemoryScopeStore::new());
        let service = ScopeService::new(
            settings,
            store.clone(),
            Arc::new(InMemoryConsentStore::new()),
            Arc::new(InMemoryRoleProvider::new()),
        )
        .await
        .expect("Failed to create scope service");
        (service, store)
    }

    #[tokio::test]
    async fn test_default_service() {
        let (service, _) = service(Settings::defaults().unwrap()).await;
        assert!(matches!(*service.cache, Cache::InMemory(_)));
        assert!(service.health_check().await.is_ok());
        assert_eq!(service.settings.registry.max_filter_count, 30);
    }

    #[tokio::test]
    async fn test_registry_writes_are_seen_by_validator() {
        let (service, store) = service(Settings::defaults().unwrap()).await;
        store.bind_resource("/orders", "orders", 1).await;

        service
            .registry
            .register_scope(Scope::new("orders", "Orders"), 1)
            .await
            .unwrap();

        let token = AccessToken {
            access_token: "token".to_string(),
            scopes: vec!["orders".to_string()],
            authz_user: AuthenticatedUser::new("alice", "carbon.super"),
        };
        assert_eq!(
            service.validator.validate_scope(&token, Some("/orders")).await,
            Decision::Allow(AllowReason::NoRoleRestriction)
        );
    }

    #[tokio::test]
    async fn test_service_without_cache() {
        let mut settings = Settings::defaults().unwrap();
        settings.cache.store = CacheStore::None;
        let (service, _) = service(settings).await;
        assert!(matches!(*service.cache, Cache::Null(_)));

        service
            .registry
            .register_scope(Scope::new("read", "Read"), 1)
            .await
            .unwrap();
        assert_eq!(service.registry.get_scope("read", 1).await.unwrap().name, "read");
    }

    #[tokio::test]
    async fn test_redis_without_url_fails() {
        let mut settings = Settings::defaults().unwrap();
        settings.cache.store = CacheStore::Redis;
        let result = ScopeService::new(
            settings,
            Arc::new(InMemoryScopeStore::new()),
            Arc::new(InMemoryConsentStore::new()),
            Arc::new(InMemoryRoleProvider::new()),
        )
        .await;
        assert!(matches!(result, Err(CacheError::Config(_))));
    }
}
