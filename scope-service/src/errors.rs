use crate::models::TenantId;
use crate::store::StoreError;
use thiserror::Error;

/// Who can fix a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input, a missing target or a conflicting name
    Client,
    /// Store or infrastructure failure
    Server,
}

/// Errors returned by the scope registry
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Scope name is not specified")]
    NameNotSpecified,
    #[error("Scope name '{0}' contains white spaces")]
    NameContainsWhitespace(String),
    #[error("Scope name '{0}' contains one of the illegal characters ? # / ( )")]
    NameNotSatisfiedPattern(String),
    #[error("Scope display name is not specified")]
    DisplayNameNotSpecified,
    #[error("Scope with the name '{0}' already exists in the system")]
    ConflictExistingScope(String),
    #[error("Scope with the name '{0}' already exists as an OIDC scope")]
    ConflictExistingOidcScope(String),
    #[error("Scope '{0}' is not found")]
    NotFound(String),
    #[error("Failed to {operation}: {source}")]
    Store {
        operation: String,
        #[source]
        source: StoreError,
    },
}

impl ScopeError {
    pub(crate) fn store<S: ToString>(operation: S, source: StoreError) -> Self {
        Self::Store {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store { .. } => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }
}

/// Errors returned by the consent manager
#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("User ID can't be null/empty")]
    UserIdNotSpecified,
    #[error("Application name can't be null/empty")]
    AppIdNotSpecified,
    #[error("Failed to {action} for user '{user_id}'{} in tenant {tenant_id}: {source}", app_suffix(.app_id))]
    Store {
        action: &'static str,
        user_id: String,
        app_id: Option<String>,
        tenant_id: TenantId,
        #[source]
        source: StoreError,
    },
}

fn app_suffix(app_id: &Option<String>) -> String {
    app_id
        .as_deref()
        .map(|app_id| format!(" and application '{app_id}'"))
        .unwrap_or_default()
}

impl ConsentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store { .. } => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }
}
