//! Collaborator contracts for the authoritative stores.
//!
//! The registry, the consent manager and the validator only ever talk to
//! persistence through these traits. Every call is tenant parameterized and may
//! fail with a [`StoreError`]. [`memory`] holds reference implementations.

use crate::models::{
    Pagination, ResourceScopeBinding, Scope, TenantId, UserApplicationScopeConsent,
};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Record already exists: {0}")]
    Duplicate(String),
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Persistence for scope definitions, scope to role bindings and resource to
/// scope bindings.
///
/// `include_oidc` widens a query from the generic OAuth2 namespace to both the
/// OAuth2 and OIDC namespaces.
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Stores a new scope in the OAuth2 namespace
    async fn add_scope(&self, scope: &Scope, tenant_id: TenantId) -> Result<(), StoreError>;

    /// Looks up an OAuth2 scope by name
    async fn get_scope_by_name(
        &self,
        name: &str,
        tenant_id: TenantId,
    ) -> Result<Option<Scope>, StoreError>;

    async fn get_all_scopes(
        &self,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError>;

    async fn get_scopes_with_pagination(
        &self,
        pagination: Pagination,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<Vec<Scope>, StoreError>;

    /// Returns the existing scopes among `requested`, ignoring unknown names
    async fn get_requested_scopes_only(
        &self,
        tenant_id: TenantId,
        include_oidc: bool,
        requested: &[String],
    ) -> Result<Vec<Scope>, StoreError>;

    /// Replaces display name, description and role bindings of the named scope
    async fn update_scope_by_name(&self, scope: &Scope, tenant_id: TenantId)
        -> Result<(), StoreError>;

    async fn delete_scope_by_name(&self, name: &str, tenant_id: TenantId)
        -> Result<(), StoreError>;

    async fn is_scope_exists(
        &self,
        name: &str,
        tenant_id: TenantId,
        include_oidc: bool,
    ) -> Result<bool, StoreError>;

    /// Roles entitled to the named scope; empty when the scope has none
    async fn get_bindings_of_scope_by_scope_name(
        &self,
        name: &str,
        tenant_id: TenantId,
    ) -> Result<Vec<String>, StoreError>;

    /// Scope protecting `resource` and the tenant owning that binding, if any
    async fn find_tenant_and_scope_of_resource(
        &self,
        resource: &str,
    ) -> Result<Option<ResourceScopeBinding>, StoreError>;
}

/// Persistence for per user, per application consent records
#[async_trait]
pub trait ConsentStore: Send + Sync {
    async fn get_user_consent_for_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<Option<UserApplicationScopeConsent>, StoreError>;

    async fn get_user_consents(
        &self,
        user_id: &str,
        tenant_id: TenantId,
    ) -> Result<Vec<UserApplicationScopeConsent>, StoreError>;

    async fn add_user_consent_for_application(
        &self,
        user_id: &str,
        tenant_id: TenantId,
        consent: UserApplicationScopeConsent,
    ) -> Result<(), StoreError>;

    async fn update_existing_consent_for_application(
        &self,
        user_id: &str,
        tenant_id: TenantId,
        consent: UserApplicationScopeConsent,
    ) -> Result<(), StoreError>;

    async fn delete_user_consent_of_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<(), StoreError>;

    async fn delete_user_consents(&self, user_id: &str, tenant_id: TenantId)
        -> Result<(), StoreError>;
}
