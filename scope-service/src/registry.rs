//! Scope catalog management.
//!
//! The registry is the only writer of scope definitions. It validates input,
//! keeps names unique across the OAuth2 and OIDC namespaces, and fronts the
//! [`ScopeStore`] with a [`ScopeCache`]: reads go to the cache first, writes go
//! to the store first and then refresh the cache.

use crate::cache::{ScopeCache, ScopeClaimCache};
use crate::config::RegistryConfig;
use crate::errors::ScopeError;
use crate::models::{Pagination, Scope, TenantId};
use crate::store::ScopeStore;
use log::debug;
use std::sync::Arc;

/// Characters a scope name may not contain
const ILLEGAL_NAME_CHARS: [char; 5] = ['?', '#', '/', '(', ')'];

pub struct ScopeRegistry {
    store: Arc<dyn ScopeStore>,
    scope_cache: ScopeCache,
    claim_cache: ScopeClaimCache,
    max_filter_count: u64,
}

impl ScopeRegistry {
    pub fn new(
        store: Arc<dyn ScopeStore>,
        scope_cache: ScopeCache,
        claim_cache: ScopeClaimCache,
        config: &RegistryConfig,
    ) -> Self {
        Self {
            store,
            scope_cache,
            claim_cache,
            max_filter_count: config.max_filter_count,
        }
    }

    /// Registers a new OAuth2 scope.
    ///
    /// Fails with a conflict when the name is taken in either namespace; the
    /// error tells which one.
    pub async fn register_scope(&self, scope: Scope, tenant_id: TenantId) -> Result<Scope, ScopeError> {
        validate_scope_name(&scope.name)?;
        validate_name_pattern(&scope.name)?;
        validate_display_name(&scope.display_name)?;

        if self.is_scope_exists_in(&scope.name, tenant_id, true).await? {
            // Narrow the check to tell which namespace holds the name
            if self.is_scope_exists_in(&scope.name, tenant_id, false).await? {
                return Err(ScopeError::ConflictExistingScope(scope.name));
            }
            return Err(ScopeError::ConflictExistingOidcScope(scope.name));
        }

        self.store
            .add_scope(&scope, tenant_id)
            .await
            .map_err(|e| ScopeError::store(format!("register scope '{}'", scope.name), e))?;
        debug!("Scope '{}' is added to the store in tenant {}", scope.name, tenant_id);

        self.scope_cache.put(&scope, tenant_id).await;
        Ok(scope)
    }

    /// Lists OAuth2 scopes, paginated when either parameter is given
    pub async fn list_scopes(
        &self,
        start_index: Option<i64>,
        count: Option<i64>,
        tenant_id: TenantId,
    ) -> Result<Vec<Scope>, ScopeError> {
        self.get_scopes(start_index, count, false, None, tenant_id).await
    }

    /// Retrieves scopes in one of three modes, in order of precedence:
    ///
    /// 1. `requested_scopes` (whitespace separated names) is not blank: exactly
    ///    those scopes, pagination is ignored;
    /// 2. neither `start_index` nor `count` is given: every scope;
    /// 3. otherwise one page, with `start_index` 1-based.
    pub async fn get_scopes(
        &self,
        start_index: Option<i64>,
        count: Option<i64>,
        include_oidc: bool,
        requested_scopes: Option<&str>,
        tenant_id: TenantId,
    ) -> Result<Vec<Scope>, ScopeError> {
        if let Some(requested) = requested_scopes.filter(|requested| !requested.trim().is_empty()) {
            let names: Vec<String> = requested.split_whitespace().map(String::from).collect();
            return self
                .store
                .get_requested_scopes_only(tenant_id, include_oidc, &names)
                .await
                .map_err(|e| ScopeError::store("get requested scopes", e));
        }

        if start_index.is_none() && count.is_none() {
            return self
                .store
                .get_all_scopes(tenant_id, include_oidc)
                .await
                .map_err(|e| ScopeError::store("get all scopes", e));
        }

        let pagination = normalize_pagination(start_index, count, self.max_filter_count);
        self.store
            .get_scopes_with_pagination(pagination, tenant_id, include_oidc)
            .await
            .map_err(|e| ScopeError::store("get all scopes with pagination", e))
    }

    /// Looks up an OAuth2 scope, populating the cache on a store hit
    pub async fn get_scope(&self, name: &str, tenant_id: TenantId) -> Result<Scope, ScopeError> {
        validate_scope_name(name)?;

        if let Some(scope) = self.scope_cache.get(name, tenant_id).await {
            return Ok(scope);
        }

        let scope = self
            .store
            .get_scope_by_name(name, tenant_id)
            .await
            .map_err(|e| ScopeError::store(format!("get scope '{name}'"), e))?
            .ok_or_else(|| ScopeError::NotFound(name.to_string()))?;
        debug!("Scope '{}' is loaded from the store for tenant {}", name, tenant_id);

        self.scope_cache.put(&scope, tenant_id).await;
        Ok(scope)
    }

    /// Whether an OAuth2 scope with this name exists
    pub async fn is_scope_exists(&self, name: &str, tenant_id: TenantId) -> Result<bool, ScopeError> {
        self.is_scope_exists_in(name, tenant_id, false).await
    }

    /// Whether a scope with this name exists, looking in the OIDC namespace too
    /// when `include_oidc` is set. A cache hit answers without the store; a miss
    /// never populates the cache.
    pub async fn is_scope_exists_in(
        &self,
        name: &str,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<bool, ScopeError> {
        if name.trim().is_empty() {
            return Err(ScopeError::NameNotSpecified);
        }

        if self.scope_cache.get(name, tenant_id).await.is_some() {
            return Ok(true);
        }

        self.store
            .is_scope_exists(name, tenant_id, include_oidc)
            .await
            .map_err(|e| ScopeError::store(format!("get scope '{name}'"), e))
    }

    /// Replaces display name, description and role bindings of an existing
    /// scope. The name is immutable and identifies the scope.
    pub async fn update_scope(&self, scope: Scope, tenant_id: TenantId) -> Result<Scope, ScopeError> {
        if scope.name.trim().is_empty() {
            return Err(ScopeError::NameNotSpecified);
        }
        validate_display_name(&scope.display_name)?;
        self.validate_scope_existence(&scope.name, tenant_id).await?;

        self.store
            .update_scope_by_name(&scope, tenant_id)
            .await
            .map_err(|e| ScopeError::store(format!("update scope '{}'", scope.name), e))?;
        debug!("Scope '{}' is updated in tenant {}", scope.name, tenant_id);

        self.scope_cache.put(&scope, tenant_id).await;
        // Role bindings decide which claims a scope exposes
        self.claim_cache.clear_scope_claim_map(tenant_id).await;
        Ok(scope)
    }

    /// Deletes an OAuth2 scope.
    ///
    /// The cache entry is evicted before the store delete. A concurrent reader
    /// may still repopulate it from the store in between; that window is
    /// accepted.
    pub async fn delete_scope(&self, name: &str, tenant_id: TenantId) -> Result<(), ScopeError> {
        validate_scope_name(name)?;
        self.validate_scope_existence(name, tenant_id).await?;

        self.scope_cache.evict(name, tenant_id).await;

        self.store
            .delete_scope_by_name(name, tenant_id)
            .await
            .map_err(|e| ScopeError::store(format!("delete scope '{name}'"), e))?;
        debug!("Scope '{}' is deleted from tenant {}", name, tenant_id);
        Ok(())
    }

    async fn validate_scope_existence(&self, name: &str, tenant_id: TenantId) -> Result<(), ScopeError> {
        if self.is_scope_exists(name, tenant_id).await? {
            Ok(())
        } else {
            Err(ScopeError::NotFound(name.to_string()))
        }
    }
}

/// Converts the caller's 1-based window into the store's 0-based one.
///
/// A missing or negative `count` falls back to `max_filter_count`; a missing
/// or sub-1 `start_index` becomes 1.
fn normalize_pagination(start_index: Option<i64>, count: Option<i64>, max_filter_count: u64) -> Pagination {
    let limit = count
        .and_then(|count| u64::try_from(count).ok())
        .unwrap_or(max_filter_count);
    let start_index = start_index
        .and_then(|start| u64::try_from(start).ok())
        .filter(|start| *start >= 1)
        .unwrap_or(1);
    Pagination {
        offset: start_index - 1,
        limit,
    }
}

fn validate_scope_name(name: &str) -> Result<(), ScopeError> {
    if name.trim().is_empty() {
        return Err(ScopeError::NameNotSpecified);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ScopeError::NameContainsWhitespace(name.to_string()));
    }
    Ok(())
}

fn validate_name_pattern(name: &str) -> Result<(), ScopeError> {
    if name.contains(ILLEGAL_NAME_CHARS) {
        return Err(ScopeError::NameNotSatisfiedPattern(name.to_string()));
    }
    Ok(())
}

fn validate_display_name(display_name: &str) -> Result<(), ScopeError> {
    if display_name.trim().is_empty() {
        return Err(ScopeError::DisplayNameNotSpecified);
    }
    Ok(())
}
