//! Role membership collaborator and the tenant scope guard around it.

use crate::models::TenantId;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised while reaching the user store
#[derive(Debug, Error)]
pub enum RoleProviderError {
    #[error("User store error: {0}")]
    UserStore(String),
}

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

/// An acquired tenant context. The context is released when the guard is
/// dropped, on every exit path of the code holding it.
pub struct TenantScope {
    tenant_id: TenantId,
    release: Option<ReleaseFn>,
}

impl TenantScope {
    /// A scope whose release runs `release` exactly once
    pub fn new<F>(tenant_id: TenantId, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            tenant_id,
            release: Some(Box::new(release)),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl fmt::Debug for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantScope")
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

impl Drop for TenantScope {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Resolves the current roles of a user.
///
/// A lookup needs a [`TenantScope`] acquired through [`RoleProvider::enter_tenant`]
/// for the tenant the roles are resolved in.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    fn enter_tenant(&self, tenant_id: TenantId) -> Result<TenantScope, RoleProviderError>;

    async fn roles_of_user(
        &self,
        scope: &TenantScope,
        username: &str,
    ) -> Result<HashSet<String>, RoleProviderError>;
}

/// Role provider backed by a process-local table of tenant → user → roles.
///
/// It counts open tenant scopes so callers can check every scope they entered
/// was released.
#[derive(Debug, Default)]
pub struct InMemoryRoleProvider {
    roles: RwLock<HashMap<TenantId, HashMap<String, HashSet<String>>>>,
    open_scopes: Arc<AtomicUsize>,
}

impl InMemoryRoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn assign_roles<I, S>(&self, tenant_id: TenantId, username: &str, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = self.roles.write().await;
        table
            .entry(tenant_id)
            .or_default()
            .entry(username.to_string())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
    }

    /// Number of tenant scopes entered but not yet released
    pub fn open_scopes(&self) -> usize {
        self.open_scopes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleProvider for InMemoryRoleProvider {
    fn enter_tenant(&self, tenant_id: TenantId) -> Result<TenantScope, RoleProviderError> {
        let open_scopes = Arc::clone(&self.open_scopes);
        open_scopes.fetch_add(1, Ordering::SeqCst);
        Ok(TenantScope::new(tenant_id, move || {
            open_scopes.fetch_sub(1, Ordering::SeqCst);
        }))
    }

    async fn roles_of_user(
        &self,
        scope: &TenantScope,
        username: &str,
    ) -> Result<HashSet<String>, RoleProviderError> {
        let table = self.roles.read().await;
        Ok(table
            .get(&scope.tenant_id())
            .and_then(|users| users.get(username))
            .cloned()
            .unwrap_or_default())
    }
}
