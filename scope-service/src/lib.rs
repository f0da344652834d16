//! # scope-service
//!
//! Authorization-scope subsystem of an OAuth2/OpenID identity provider.
//!
//! ## Components
//!
//! - **Registry:** scope catalog CRUD with cross-namespace name uniqueness and a
//!   cache-aside read path.
//! - **Consent:** per-user, per-application consent records and the re-consent gate.
//! - **Validator:** decides whether an access token may access a protected resource,
//!   combining the token's scopes with the user's current roles.
//!
//! Persistence, role membership and token issuance are collaborators behind the
//! traits in [`store`] and [`roles`].

pub mod cache;
pub mod config;
pub mod consent;
pub mod errors;
pub mod models;
pub mod registry;
pub mod roles;
pub mod service;
pub mod store;
#[cfg(test)]
mod test_utils;
pub mod validator;

pub use crate::config::Settings;
pub use crate::consent::ConsentManager;
pub use crate::errors::{ConsentError, ErrorKind, ScopeError};
pub use crate::models::{AccessToken, AuthenticatedUser, Scope, TenantId};
pub use crate::registry::ScopeRegistry;
pub use crate::service::ScopeService;
pub use crate::validator::{AllowReason, Decision, DenyReason, RoleBasedScopeValidator, ScopeValidator};
