use confique::Config;

/// Configuration for the role based scope validator
#[derive(Debug, Config, Clone)]
pub struct ValidatorConfig {
    /// Skip the role check for federated users, trusting the roles asserted by
    /// the external identity provider instead (default: false)
    #[config(env = "SCOPES_VALIDATOR_CHECK_ROLES_FROM_SAML_ASSERTION", default = false)]
    pub check_roles_from_saml_assertion: bool,

    /// Allow raw access tokens to appear in debug logs (default: false)
    #[config(env = "SCOPES_VALIDATOR_LOG_ACCESS_TOKENS", default = false)]
    pub log_access_tokens: bool,
}
