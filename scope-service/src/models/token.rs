//! Access token as seen by the scope validator. Tokens are issued elsewhere;
//! this crate only reads them.

use serde::{Deserialize, Serialize};

/// The user an access token was issued to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub tenant_domain: String,
    /// Authenticated through an external identity provider
    #[serde(default)]
    pub federated: bool,
}

impl AuthenticatedUser {
    pub fn new(username: impl Into<String>, tenant_domain: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            tenant_domain: tenant_domain.into(),
            federated: false,
        }
    }

    pub fn federated(mut self) -> Self {
        self.federated = true;
        self
    }

    /// Username without the trailing `@{tenant_domain}` qualifier, as the user
    /// store knows it inside its own tenant
    pub fn tenant_aware_username(&self) -> &str {
        self.username
            .strip_suffix(self.tenant_domain.as_str())
            .and_then(|name| name.strip_suffix('@'))
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Raw token value, only used for diagnostics
    pub access_token: String,
    /// Scopes granted to the token
    #[serde(default)]
    pub scopes: Vec<String>,
    pub authz_user: AuthenticatedUser,
}

impl AccessToken {
    /// Exact membership test, no prefix or pattern matching
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|granted| granted == scope)
    }
}
