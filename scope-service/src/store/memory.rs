//! In-memory reference implementations of [`ScopeStore`] and [`ConsentStore`].

use super::{ConsentStore, ScopeStore, StoreError};
use crate::models::{
    Pagination, ResourceScopeBinding, Scope, ScopeType, TenantId, UserApplicationScopeConsent,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredScope {
    scope: Scope,
    scope_type: ScopeType,
}

impl StoredScope {
    fn visible(&self, include_oidc: bool) -> bool {
        include_oidc || self.scope_type == ScopeType::OAuth2
    }
}

#[derive(Debug, Default)]
struct ScopeTables {
    /// Scopes per tenant, ordered by name
    scopes: HashMap<TenantId, BTreeMap<String, StoredScope>>,
    /// Resource identifier to its protecting scope
    resources: HashMap<String, ResourceScopeBinding>,
}

/// Scope store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryScopeStore {
    tables: RwLock<ScopeTables>,
}

impl InMemoryScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a scope in the OIDC namespace. OIDC scopes are managed outside the
    /// registry, so this is the only way they enter the store.
    pub async fn add_oidc_scope(&self, scope: Scope, tenant_id: TenantId) {
        let mut tables = self.tables.write().await;
        tables.scopes.entry(tenant_id).or_default().insert(
            scope.name.clone(),
            StoredScope {
                scope,
                scope_type: ScopeType::Oidc,
            },
        );
    }

    /// Protects `resource` with `scope`, owned by `tenant_id`
    pub async fn bind_resource(
        &self,
        resource: impl Into<String>,
        scope: impl Into<String>,
        tenant_id: TenantId,
    ) {
        let mut tables = self.tables.write().await;
        tables.resources.insert(
            resource.into(),
            ResourceScopeBinding {
                scope: scope.into(),
                tenant_id,
            },
        );
    }
}

#[async_trait]
impl ScopeStore for InMemoryScopeStore {
    async fn add_scope(&self, scope: &Scope, tenant_id: TenantId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let tenant_scopes = tables.scopes.entry(tenant_id).or_default();
        if tenant_scopes.contains_key(&scope.name) {
            return Err(StoreError::Duplicate(format!(
                "scope '{}' in tenant {}",
                scope.name, tenant_id
            )));
        }
        tenant_scopes.insert(
            scope.name.clone(),
            StoredScope {
                scope: scope.clone(),
                scope_type: ScopeType::OAuth2,
            },
        );
        Ok(())
    }

    async fn get_scope_by_name(
        &self,
        name: &str,
        tenant_id: TenantId,
    ) -> Result<Option<Scope>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .scopes
            .get(&tenant_id)
            .and_then(|scopes| scopes.get(name))
            .filter(|stored| stored.scope_type == ScopeType::OAuth2)
            .map(|stored| stored.scope.clone()))
    }

    async fn get_all_scopes(
        &self,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .scopes
            .get(&tenant_id)
            .map(|scopes| {
                scopes
                    .values()
                    .filter(|stored| stored.visible(include_oidc))
                    .map(|stored| stored.scope.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_scopes_with_pagination(
        &self,
        pagination: Pagination,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError> {
        let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        let all = self.get_all_scopes(tenant_id, include_oidc).await?;
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_requested_scopes_only(
        &self,
        tenant_id: TenantId,
        include_oidc: bool,
        requested: &[String],
    ) -> Result<Vec<Scope>, StoreError> {
        let all = self.get_all_scopes(tenant_id, include_oidc).await?;
        Ok(all
            .into_iter()
            .filter(|scope| requested.contains(&scope.name))
            .collect())
    }

    async fn update_scope_by_name(
        &self,
        scope: &Scope,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .scopes
            .get_mut(&tenant_id)
            .and_then(|scopes| scopes.get_mut(&scope.name))
            .filter(|stored| stored.scope_type == ScopeType::OAuth2)
            .ok_or_else(|| {
                StoreError::NotFound(format!("scope '{}' in tenant {}", scope.name, tenant_id))
            })?;
        stored.scope = scope.clone();
        Ok(())
    }

    async fn delete_scope_by_name(&self, name: &str, tenant_id: TenantId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(scopes) = tables.scopes.get_mut(&tenant_id) {
            if scopes
                .get(name)
                .is_some_and(|stored| stored.scope_type == ScopeType::OAuth2)
            {
                scopes.remove(name);
            }
        }
        Ok(())
    }

    async fn is_scope_exists(
        &self,
        name: &str,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .scopes
            .get(&tenant_id)
            .and_then(|scopes| scopes.get(name))
            .is_some_and(|stored| stored.visible(include_oidc)))
    }

    async fn get_bindings_of_scope_by_scope_name(
        &self,
        name: &str,
        tenant_id: TenantId,
    ) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .scopes
            .get(&tenant_id)
            .and_then(|scopes| scopes.get(name))
            .map(|stored| stored.scope.bindings.clone())
            .unwrap_or_default())
    }

    async fn find_tenant_and_scope_of_resource(
        &self,
        resource: &str,
    ) -> Result<Option<ResourceScopeBinding>, StoreError> {
        Ok(self.tables.read().await.resources.get(resource).cloned())
    }
}

type ConsentKey = (TenantId, String);

/// Consent store keeping everything in process memory.
///
/// Both add and update replace the whole record of the (user, app, tenant)
/// triple.
#[derive(Debug, Default)]
pub struct InMemoryConsentStore {
    /// Records per (tenant, user), keyed by application
    consents: RwLock<HashMap<ConsentKey, BTreeMap<String, UserApplicationScopeConsent>>>,
}

impl InMemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn upsert(&self, user_id: &str, tenant_id: TenantId, consent: UserApplicationScopeConsent) {
        let mut consents = self.consents.write().await;
        consents
            .entry((tenant_id, user_id.to_string()))
            .or_default()
            .insert(consent.app_id.clone(), consent);
    }
}

#[async_trait]
impl ConsentStore for InMemoryConsentStore {
    async fn get_user_consent_for_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<Option<UserApplicationScopeConsent>, StoreError> {
        let consents = self.consents.read().await;
        Ok(consents
            .get(&(tenant_id, user_id.to_string()))
            .and_then(|apps| apps.get(app_id))
            .cloned())
    }

    async fn get_user_consents(
        &self,
        user_id: &str,
        tenant_id: TenantId,
    ) -> Result<Vec<UserApplicationScopeConsent>, StoreError> {
        let consents = self.consents.read().await;
        Ok(consents
            .get(&(tenant_id, user_id.to_string()))
            .map(|apps| apps.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_user_consent_for_application(
        &self,
        user_id: &str,
        tenant_id: TenantId,
        consent: UserApplicationScopeConsent,
    ) -> Result<(), StoreError> {
        self.upsert(user_id, tenant_id, consent).await;
        Ok(())
    }

    async fn update_existing_consent_for_application(
        &self,
        user_id: &str,
        tenant_id: TenantId,
        consent: UserApplicationScopeConsent,
    ) -> Result<(), StoreError> {
        self.upsert(user_id, tenant_id, consent).await;
        Ok(())
    }

    async fn delete_user_consent_of_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        let mut consents = self.consents.write().await;
        if let Some(apps) = consents.get_mut(&(tenant_id, user_id.to_string())) {
            apps.remove(app_id);
        }
        Ok(())
    }

    async fn delete_user_consents(&self, user_id: &str, tenant_id: TenantId) -> Result<(), StoreError> {
        self.consents
            .write()
            .await
            .remove(&(tenant_id, user_id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scope_namespaces() {
        let store = InMemoryScopeStore::new();
        store
            .add_scope(&Scope::new("read", "Read"), 1)
            .await
            .unwrap();
        store.add_oidc_scope(Scope::new("openid", "OpenID"), 1).await;

        assert!(store.is_scope_exists("read", 1, false).await.unwrap());
        assert!(!store.is_scope_exists("openid", 1, false).await.unwrap());
        assert!(store.is_scope_exists("openid", 1, true).await.unwrap());
        assert!(!store.is_scope_exists("read", 2, true).await.unwrap());

        // OIDC scopes are not reachable through the OAuth2 lookups
        assert!(store.get_scope_by_name("openid", 1).await.unwrap().is_none());
        assert_eq!(store.get_all_scopes(1, false).await.unwrap().len(), 1);
        assert_eq!(store.get_all_scopes(1, true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_duplicate_scope_is_rejected() {
        let store = InMemoryScopeStore::new();
        store.add_scope(&Scope::new("read", "Read"), 1).await.unwrap();
        let result = store.add_scope(&Scope::new("read", "Read again"), 1).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let store = InMemoryScopeStore::new();
        for name in ["a", "b", "c", "d"] {
            store.add_scope(&Scope::new(name, name), 1).await.unwrap();
        }
        let page = store
            .get_scopes_with_pagination(Pagination { offset: 1, limit: 2 }, 1, false)
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|scope| scope.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_consent_upsert_replaces_record() {
        let store = InMemoryConsentStore::new();
        store
            .add_user_consent_for_application(
                "alice",
                1,
                UserApplicationScopeConsent::new("app", vec!["read".into()], vec![]),
            )
            .await
            .unwrap();
        store
            .update_existing_consent_for_application(
                "alice",
                1,
                UserApplicationScopeConsent::new("app", vec!["write".into()], vec!["admin".into()]),
            )
            .await
            .unwrap();

        let consent = store
            .get_user_consent_for_application("alice", "app", 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(consent.approved_scopes, vec!["write".to_string()]);
        assert_eq!(consent.denied_scopes, vec!["admin".to_string()]);
        assert_eq!(store.get_user_consents("alice", 1).await.unwrap().len(), 1);
    }
}
