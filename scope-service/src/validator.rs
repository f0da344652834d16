//! Role based scope validation of access tokens against protected resources.
//!
//! The validator never fails: infrastructure faults become a deny decision
//! plus an error log, so token validation stays available while supporting
//! stores are degraded.

use crate::cache::{ResourceScopeCache, ResourceScopeEntry, ScopeCache};
use crate::config::ValidatorConfig;
use crate::models::{AccessToken, ResourceScopeBinding, TenantId};
use crate::roles::{RoleProvider, RoleProviderError};
use crate::store::{ScopeStore, StoreError};
use async_trait::async_trait;
use log::{debug, error};
use std::collections::HashSet;
use std::sync::Arc;

const ROLE_BASED_SCOPE_VALIDATOR_NAME: &str = "Role based scope validator";

/// Why a token was allowed to access a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// No resource to protect
    NoResource,
    /// The token carries no scopes and is unrestricted at this layer
    UnscopedToken,
    /// No scope is bound to the resource
    UnprotectedResource,
    /// Federated user while role checks are delegated to the identity provider
    FederatedRoleCheckSkipped,
    /// The required scope is not bound to any role
    NoRoleRestriction,
    /// The user holds one of the roles bound to the required scope
    RoleMatched,
}

/// Why a token was denied access to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The token does not bear the scope protecting the resource
    MissingScope,
    /// None of the user's roles is bound to the required scope
    NoMatchingRole,
    /// The user has no roles at all
    NoUserRoles,
    /// The scope store could not be reached
    StoreFault,
    /// The user store could not be reached
    RoleProviderFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(AllowReason),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Decides whether an access token may access a resource
#[async_trait]
pub trait ScopeValidator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn validate_scope(&self, token: &AccessToken, resource: Option<&str>) -> Decision;
}

/// Allows a token when it bears the scope protecting the resource and its user
/// still holds a role bound to that scope.
///
/// Roles are resolved in the tenant owning the resource, under a tenant scope
/// that is released before the decision is returned.
pub struct RoleBasedScopeValidator {
    store: Arc<dyn ScopeStore>,
    resource_cache: ResourceScopeCache,
    scope_cache: ScopeCache,
    roles: Arc<dyn RoleProvider>,
    check_roles_from_saml_assertion: bool,
    log_access_tokens: bool,
}

impl RoleBasedScopeValidator {
    pub fn new(
        store: Arc<dyn ScopeStore>,
        resource_cache: ResourceScopeCache,
        scope_cache: ScopeCache,
        roles: Arc<dyn RoleProvider>,
        config: &ValidatorConfig,
    ) -> Self {
        Self {
            store,
            resource_cache,
            scope_cache,
            roles,
            check_roles_from_saml_assertion: config.check_roles_from_saml_assertion,
            log_access_tokens: config.log_access_tokens,
        }
    }

    /// Scope protecting `resource` and the tenant owning it.
    ///
    /// Store answers are cached even when the resource is unprotected.
    async fn resource_scope(&self, resource: &str) -> Result<Option<ResourceScopeBinding>, StoreError> {
        if let Some(entry) = self.resource_cache.get(resource).await {
            return Ok(entry.scope.zip(entry.tenant_id).map(|(scope, tenant_id)| {
                ResourceScopeBinding { scope, tenant_id }
            }));
        }

        let binding = self.store.find_tenant_and_scope_of_resource(resource).await?;
        self.resource_cache
            .put(resource, &ResourceScopeEntry::from(binding.clone()))
            .await;
        Ok(binding)
    }

    /// Roles bound to `scope`; a cached scope definition carries them
    async fn roles_of_scope(&self, scope: &str, tenant_id: TenantId) -> Result<Vec<String>, StoreError> {
        if let Some(cached) = self.scope_cache.get(scope, tenant_id).await {
            return Ok(cached.bindings);
        }
        self.store
            .get_bindings_of_scope_by_scope_name(scope, tenant_id)
            .await
    }

    async fn roles_of_user(
        &self,
        tenant_id: TenantId,
        username: &str,
    ) -> Result<HashSet<String>, RoleProviderError> {
        let tenant_scope = self.roles.enter_tenant(tenant_id)?;
        self.roles.roles_of_user(&tenant_scope, username).await
    }
}

#[async_trait]
impl ScopeValidator for RoleBasedScopeValidator {
    fn name(&self) -> &'static str {
        ROLE_BASED_SCOPE_VALIDATOR_NAME
    }

    async fn validate_scope(&self, token: &AccessToken, resource: Option<&str>) -> Decision {
        let Some(resource) = resource else {
            return Decision::Allow(AllowReason::NoResource);
        };

        if token.scopes.is_empty() {
            return Decision::Allow(AllowReason::UnscopedToken);
        }

        let binding = match self.resource_scope(resource).await {
            Ok(binding) => binding,
            Err(e) => {
                error!("Error when resolving the scope of resource '{}': {}", resource, e);
                return Decision::Deny(DenyReason::StoreFault);
            }
        };
        let Some(ResourceScopeBinding {
            scope: required_scope,
            tenant_id,
        }) = binding
        else {
            debug!("Resource '{}' is not protected with a scope", resource);
            return Decision::Allow(AllowReason::UnprotectedResource);
        };

        let user = &token.authz_user;
        if !token.has_scope(&required_scope) {
            if self.log_access_tokens {
                debug!(
                    "Access token '{}' does not bear the scope '{}'",
                    token.access_token, required_scope
                );
            } else {
                debug!(
                    "Access token of user '{}' does not bear the scope '{}'",
                    user.username, required_scope
                );
            }
            return Decision::Deny(DenyReason::MissingScope);
        }

        if user.federated && self.check_roles_from_saml_assertion {
            debug!(
                "Skipping the role check of federated user '{}' for scope '{}'",
                user.username, required_scope
            );
            return Decision::Allow(AllowReason::FederatedRoleCheckSkipped);
        }

        let scope_roles = match self.roles_of_scope(&required_scope, tenant_id).await {
            Ok(roles) => roles,
            Err(e) => {
                error!(
                    "Error when getting the roles of scope '{}' in tenant {}: {}",
                    required_scope, tenant_id, e
                );
                return Decision::Deny(DenyReason::StoreFault);
            }
        };
        if scope_roles.is_empty() {
            debug!("Did not find any roles associated to the scope '{}'", required_scope);
            return Decision::Allow(AllowReason::NoRoleRestriction);
        }
        debug!(
            "Found roles of scope '{}': {}",
            required_scope,
            scope_roles.join(", ")
        );

        let username = user.tenant_aware_username();
        let user_roles = match self.roles_of_user(tenant_id, username).await {
            Ok(roles) => roles,
            Err(e) => {
                error!(
                    "Error when getting the roles of user '{}' in tenant {}: {}",
                    username, tenant_id, e
                );
                return Decision::Deny(DenyReason::RoleProviderFault);
            }
        };
        if user_roles.is_empty() {
            debug!("No roles associated for the user '{}'", user.username);
            return Decision::Deny(DenyReason::NoUserRoles);
        }
        debug!(
            "Found {} roles of user '{}' in tenant {}",
            user_roles.len(),
            user.username,
            tenant_id
        );

        if scope_roles.iter().any(|role| user_roles.contains(role)) {
            Decision::Allow(AllowReason::RoleMatched)
        } else {
            Decision::Deny(DenyReason::NoMatchingRole)
        }
    }
}
