use crate::cache::memory::InMemoryCache;
use crate::cache::{Cache, ScopeCache, ScopeClaimCache};
use crate::config::RegistryConfig;
use crate::models::{
    Pagination, ResourceScopeBinding, Scope, TenantId, UserApplicationScopeConsent,
};
use crate::registry::ScopeRegistry;
use crate::roles::{InMemoryRoleProvider, RoleProvider, RoleProviderError, TenantScope};
use crate::store::memory::InMemoryScopeStore;
use crate::store::{ConsentStore, ScopeStore, StoreError};
use async_trait::async_trait;
use log::LevelFilter;
use std::collections::HashSet;
use std::sync::Arc;

/// Routes log output through the test harness at debug level
pub fn setup_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A small in-memory cache with a one minute TTL
pub fn memory_cache() -> Cache {
    match InMemoryCache::new(60, 16) {
        Ok(cache) => Cache::InMemory(cache),
        Err(e) => panic!("Failed to create test cache: {e}"),
    }
}

/// Registry over `store` with every cache namespace on `cache` and the
/// default page size
pub fn registry_with_store(store: Arc<dyn ScopeStore>, cache: Cache) -> ScopeRegistry {
    ScopeRegistry::new(
        store,
        ScopeCache::new(cache.clone()),
        ScopeClaimCache::new(cache),
        &RegistryConfig {
            max_filter_count: 30,
        },
    )
}

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Backend("connection refused".to_string()))
}

/// Scope store whose every call fails, for asserting that a code path never
/// reaches the store or that faults are wrapped
pub struct FailingScopeStore;

#[async_trait]
impl ScopeStore for FailingScopeStore {
    async fn add_scope(&self, _scope: &Scope, _tenant_id: TenantId) -> Result<(), StoreError> {
        unavailable()
    }

    async fn get_scope_by_name(
        &self,
        _name: &str,
        _tenant_id: TenantId,
    ) -> Result<Option<Scope>, StoreError> {
        unavailable()
    }

    async fn get_all_scopes(
        &self,
        _tenant_id: TenantId,
        _include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError> {
        unavailable()
    }

    async fn get_scopes_with_pagination(
        &self,
        _pagination: Pagination,
        _tenant_id: TenantId,
        _include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError> {
        unavailable()
    }

    async fn get_requested_scopes_only(
        &self,
        _tenant_id: TenantId,
        _include_oidc: bool,
        _requested: &[String],
    ) -> Result<Vec<Scope>, StoreError> {
        unavailable()
    }

    async fn update_scope_by_name(
        &self,
        _scope: &Scope,
        _tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn delete_scope_by_name(
        &self,
        _name: &str,
        _tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn is_scope_exists(
        &self,
        _name: &str,
        _tenant_id: TenantId,
        _include_oidc: bool,
    ) -> Result<bool, StoreError> {
        unavailable()
    }

    async fn get_bindings_of_scope_by_scope_name(
        &self,
        _name: &str,
        _tenant_id: TenantId,
    ) -> Result<Vec<String>, StoreError> {
        unavailable()
    }

    async fn find_tenant_and_scope_of_resource(
        &self,
        _resource: &str,
    ) -> Result<Option<ResourceScopeBinding>, StoreError> {
        unavailable()
    }
}

/// Consent store whose every call fails
pub struct FailingConsentStore;

#[async_trait]
impl ConsentStore for FailingConsentStore {
    async fn get_user_consent_for_application(
        &self,
        _user_id: &str,
        _app_id: &str,
        _tenant_id: TenantId,
    ) -> Result<Option<UserApplicationScopeConsent>, StoreError> {
        unavailable()
    }

    async fn get_user_consents(
        &self,
        _user_id: &str,
        _tenant_id: TenantId,
    ) -> Result<Vec<UserApplicationScopeConsent>, StoreError> {
        unavailable()
    }

    async fn add_user_consent_for_application(
        &self,
        _user_id: &str,
        _tenant_id: TenantId,
        _consent: UserApplicationScopeConsent,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn update_existing_consent_for_application(
        &self,
        _user_id: &str,
        _tenant_id: TenantId,
        _consent: UserApplicationScopeConsent,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn delete_user_consent_of_application(
        &self,
        _user_id: &str,
        _app_id: &str,
        _tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn delete_user_consents(
        &self,
        _user_id: &str,
        _tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        unavailable()
    }
}

/// Role provider that enters tenants normally but fails every role lookup.
/// Open tenant scopes are counted like [`InMemoryRoleProvider`] does.
#[derive(Default)]
pub struct FailingRoleProvider {
    tenants: InMemoryRoleProvider,
}

impl FailingRoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_scopes(&self) -> usize {
        self.tenants.open_scopes()
    }
}

#[async_trait]
impl RoleProvider for FailingRoleProvider {
    fn enter_tenant(&self, tenant_id: TenantId) -> Result<TenantScope, RoleProviderError> {
        self.tenants.enter_tenant(tenant_id)
    }

    async fn roles_of_user(
        &self,
        _scope: &TenantScope,
        _username: &str,
    ) -> Result<HashSet<String>, RoleProviderError> {
        Err(RoleProviderError::UserStore("user store is unreachable".to_string()))
    }
}

/// In-memory scope store whose role binding lookups fail while every other
/// call reaches the wrapped store
#[derive(Default)]
pub struct BindingsFailingScopeStore {
    pub inner: InMemoryScopeStore,
}

#[async_trait]
impl ScopeStore for BindingsFailingScopeStore {
    async fn add_scope(&self, scope: &Scope, tenant_id: TenantId) -> Result<(), StoreError> {
        self.inner.add_scope(scope, tenant_id).await
    }

    async fn get_scope_by_name(
        &self,
        name: &str,
        tenant_id: TenantId,
    ) -> Result<Option<Scope>, StoreError> {
        self.inner.get_scope_by_name(name, tenant_id).await
    }

    async fn get_all_scopes(
        &self,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError> {
        self.inner.get_all_scopes(tenant_id, include_oidc).await
    }

    async fn get_scopes_with_pagination(
        &self,
        pagination: Pagination,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError> {
        self.inner
            .get_scopes_with_pagination(pagination, tenant_id, include_oidc)
            .await
    }

    async fn get_requested_scopes_only(
        &self,
        tenant_id: TenantId,
        include_oidc: bool,
        requested: &[String],
    ) -> Result<Vec<Scope>, StoreError> {
        self.inner
            .get_requested_scopes_only(tenant_id, include_oidc, requested)
            .await
    }

    async fn update_scope_by_name(
        &self,
        scope: &Scope,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        self.inner.update_scope_by_name(scope, tenant_id).await
    }

    async fn delete_scope_by_name(
        &self,
        name: &str,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        self.inner.delete_scope_by_name(name, tenant_id).await
    }

    async fn is_scope_exists(
        &self,
        name: &str,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<bool, StoreError> {
        self.inner.is_scope_exists(name, tenant_id, include_oidc).await
    }

    async fn get_bindings_of_scope_by_scope_name(
        &self,
        _name: &str,
        _tenant_id: TenantId,
    ) -> Result<Vec<String>, StoreError> {
        unavailable()
    }

    async fn find_tenant_and_scope_of_resource(
        &self,
        resource: &str,
    ) -> Result<Option<ResourceScopeBinding>, StoreError> {
        self.inner.find_tenant_and_scope_of_resource(resource).await
    }
}
