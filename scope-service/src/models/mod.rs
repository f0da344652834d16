//! Domain models shared by the registry, the consent manager and the validator.

pub mod consent;
pub mod scope;
pub mod token;

pub use consent::{ScopeConsentResponse, UserApplicationScopeConsent};
pub use scope::{Pagination, ResourceScopeBinding, Scope, ScopeType};
pub use token::{AccessToken, AuthenticatedUser};

/// Numeric identifier of a tenant. Scopes, bindings, consents and caches are
/// partitioned by it.
pub type TenantId = i32;
