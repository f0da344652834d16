//! Scope domain model.

use crate::models::TenantId;
use serde::{Deserialize, Serialize};

/// A named permission unit a client can request and a user can consent to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Unique, tenant scoped and immutable name
    pub name: String,
    /// Human readable name shown on consent pages
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Names of the roles entitled to exercise the scope
    #[serde(default)]
    pub bindings: Vec<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: None,
            bindings: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_bindings<I, S>(mut self, bindings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bindings = bindings.into_iter().map(Into::into).collect();
        self
    }
}

/// The two namespaces scope names live in. Names are unique across both.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    OAuth2,
    Oidc,
}

/// The scope that protects a resource, and the tenant owning that binding.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResourceScopeBinding {
    pub scope: String,
    pub tenant_id: TenantId,
}

/// Offset/limit window handed to the store for paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 0-based offset of the first scope
    pub offset: u64,
    pub limit: u64,
}
