//! Per-user, per-application consent records.

use crate::errors::ConsentError;
use crate::models::{ScopeConsentResponse, TenantId, UserApplicationScopeConsent};
use crate::store::{ConsentStore, StoreError};
use log::debug;
use std::sync::Arc;

/// Sole writer of consent records. Blank user or application identifiers are
/// rejected before the store is reached.
pub struct ConsentManager {
    store: Arc<dyn ConsentStore>,
}

impl ConsentManager {
    pub fn new(store: Arc<dyn ConsentStore>) -> Self {
        Self { store }
    }

    /// The user's consent for one application, if a record exists
    pub async fn get_user_consent_for_app(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<Option<ScopeConsentResponse>, ConsentError> {
        validate_user_id(user_id)?;
        validate_app_id(app_id)?;

        let consent = self
            .store
            .get_user_consent_for_application(user_id, app_id, tenant_id)
            .await
            .map_err(|e| store_error("retrieve user consent", user_id, Some(app_id), tenant_id, e))?;
        debug!(
            "Retrieved the user consent for user '{}' and application '{}'",
            user_id, app_id
        );
        Ok(consent.map(|record| ScopeConsentResponse::from_record(user_id, tenant_id, record)))
    }

    /// Every consent record of the user in the tenant
    pub async fn get_user_consents(
        &self,
        user_id: &str,
        tenant_id: TenantId,
    ) -> Result<Vec<ScopeConsentResponse>, ConsentError> {
        validate_user_id(user_id)?;

        let consents = self
            .store
            .get_user_consents(user_id, tenant_id)
            .await
            .map_err(|e| store_error("retrieve user consents", user_id, None, tenant_id, e))?;
        debug!("Retrieved {} consents for user '{}'", consents.len(), user_id);
        Ok(consents
            .into_iter()
            .map(|record| ScopeConsentResponse::from_record(user_id, tenant_id, record))
            .collect())
    }

    /// Records the user's first consent decision for an application.
    ///
    /// The store upserts, so this replaces any record already present.
    pub async fn add_user_consent_for_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
        approved_scopes: Vec<String>,
        denied_scopes: Vec<String>,
    ) -> Result<(), ConsentError> {
        validate_user_id(user_id)?;
        validate_app_id(app_id)?;

        let consent = UserApplicationScopeConsent::new(app_id, approved_scopes, denied_scopes);
        self.store
            .add_user_consent_for_application(user_id, tenant_id, consent)
            .await
            .map_err(|e| store_error("add user consent", user_id, Some(app_id), tenant_id, e))?;
        debug!(
            "Added the user consent for user '{}' and application '{}' in tenant {}",
            user_id, app_id, tenant_id
        );
        Ok(())
    }

    /// Replaces the user's consent record for an application
    pub async fn update_user_consent_for_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
        approved_scopes: Vec<String>,
        denied_scopes: Vec<String>,
    ) -> Result<(), ConsentError> {
        validate_user_id(user_id)?;
        validate_app_id(app_id)?;

        let consent = UserApplicationScopeConsent::new(app_id, approved_scopes, denied_scopes);
        self.store
            .update_existing_consent_for_application(user_id, tenant_id, consent)
            .await
            .map_err(|e| store_error("update user consent", user_id, Some(app_id), tenant_id, e))?;
        debug!(
            "Updated the user consent for user '{}' and application '{}' in tenant {}",
            user_id, app_id, tenant_id
        );
        Ok(())
    }

    pub async fn revoke_user_consent_for_application(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<(), ConsentError> {
        validate_user_id(user_id)?;
        validate_app_id(app_id)?;

        self.store
            .delete_user_consent_of_application(user_id, app_id, tenant_id)
            .await
            .map_err(|e| store_error("revoke user consent", user_id, Some(app_id), tenant_id, e))?;
        debug!(
            "Revoked the user consent for user '{}' and application '{}' in tenant {}",
            user_id, app_id, tenant_id
        );
        Ok(())
    }

    /// Revokes the user's consents for every application in the tenant
    pub async fn revoke_user_consents(&self, user_id: &str, tenant_id: TenantId) -> Result<(), ConsentError> {
        validate_user_id(user_id)?;

        self.store
            .delete_user_consents(user_id, tenant_id)
            .await
            .map_err(|e| store_error("revoke user consents", user_id, None, tenant_id, e))?;
        debug!("Revoked all consents of user '{}' in tenant {}", user_id, tenant_id);
        Ok(())
    }

    /// Whether the existing consent already covers a new request, so the user
    /// need not be asked again.
    ///
    /// Every scope in `required_approved` must already be approved and every
    /// scope in `required_denied` must already be denied. Empty requirements
    /// pass.
    pub async fn has_user_already_provided_consent_for_all_requested_scopes(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
        required_approved: &[String],
        required_denied: &[String],
    ) -> Result<bool, ConsentError> {
        validate_user_id(user_id)?;
        validate_app_id(app_id)?;

        let existing = self
            .existing_consent(user_id, app_id, tenant_id)
            .await
            .map_err(|e| {
                store_error("check already given consent", user_id, Some(app_id), tenant_id, e)
            })?;

        let approved_covered = required_approved
            .iter()
            .all(|scope| existing.approved_scopes.contains(scope));
        let denied_covered = required_denied
            .iter()
            .all(|scope| existing.denied_scopes.contains(scope));
        Ok(approved_covered && denied_covered)
    }

    /// Whether the user has approved or denied anything for the application
    pub async fn is_user_has_an_existing_consent_for_app(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<bool, ConsentError> {
        validate_user_id(user_id)?;
        validate_app_id(app_id)?;

        let consent_exists = self
            .existing_consent(user_id, app_id, tenant_id)
            .await
            .map_err(|e| store_error("check existing consent", user_id, Some(app_id), tenant_id, e))?
            .has_decisions();
        debug!(
            "Existing consent status: {} for user '{}', app '{}' in tenant {}",
            consent_exists, user_id, app_id, tenant_id
        );
        Ok(consent_exists)
    }

    /// The stored record, or an empty one when the user never consented
    async fn existing_consent(
        &self,
        user_id: &str,
        app_id: &str,
        tenant_id: TenantId,
    ) -> Result<UserApplicationScopeConsent, StoreError> {
        Ok(self
            .store
            .get_user_consent_for_application(user_id, app_id, tenant_id)
            .await?
            .unwrap_or_else(|| UserApplicationScopeConsent::new(app_id, Vec::new(), Vec::new())))
    }
}

fn store_error(
    action: &'static str,
    user_id: &str,
    app_id: Option<&str>,
    tenant_id: TenantId,
    source: StoreError,
) -> ConsentError {
    ConsentError::Store {
        action,
        user_id: user_id.to_string(),
        app_id: app_id.map(String::from),
        tenant_id,
        source,
    }
}

fn validate_user_id(user_id: &str) -> Result<(), ConsentError> {
    if user_id.trim().is_empty() {
        return Err(ConsentError::UserIdNotSpecified);
    }
    Ok(())
}

fn validate_app_id(app_id: &str) -> Result<(), ConsentError> {
    if app_id.trim().is_empty() {
        return Err(ConsentError::AppIdNotSpecified);
    }
    Ok(())
}
