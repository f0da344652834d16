//! Consent domain model.

use crate::models::TenantId;
use serde::{Deserialize, Serialize};

/// A user's recorded approval and denial of scopes for one application.
///
/// The approved and denied lists are expected to be disjoint; nothing here
/// enforces it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct UserApplicationScopeConsent {
    pub app_id: String,
    #[serde(default)]
    pub approved_scopes: Vec<String>,
    #[serde(default)]
    pub denied_scopes: Vec<String>,
}

impl UserApplicationScopeConsent {
    pub fn new(app_id: impl Into<String>, approved_scopes: Vec<String>, denied_scopes: Vec<String>) -> Self {
        Self {
            app_id: app_id.into(),
            approved_scopes,
            denied_scopes,
        }
    }

    /// True when the record holds at least one approved or denied scope
    pub fn has_decisions(&self) -> bool {
        !self.approved_scopes.is_empty() || !self.denied_scopes.is_empty()
    }
}

/// Consent record as returned to callers of the consent manager
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScopeConsentResponse {
    pub user_id: String,
    pub app_id: String,
    pub tenant_id: TenantId,
    pub approved_scopes: Vec<String>,
    pub denied_scopes: Vec<String>,
}

impl ScopeConsentResponse {
    pub(crate) fn from_record(
        user_id: &str,
        tenant_id: TenantId,
        record: UserApplicationScopeConsent,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            app_id: record.app_id,
            tenant_id,
            approved_scopes: record.approved_scopes,
            denied_scopes: record.denied_scopes,
        }
    }
}
