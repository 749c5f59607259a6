//! Shared state for the auth endpoints.

use super::pending::PendingLogins;
use crate::forms::{LoginSchema, LoginValues, Schema};
use crate::provider::{Credentials, IdentityProvider};
use crate::reset::{PasswordReset, DEFAULT_RESET_REDIRECT_URL};
use std::sync::Arc;

pub type LoginSchemaRef = Arc<dyn Schema<LoginValues, Credentials>>;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    reset_redirect_url: String,
    password_min_length: usize,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            reset_redirect_url: DEFAULT_RESET_REDIRECT_URL.to_string(),
            password_min_length: 1,
        }
    }

    #[must_use]
    pub fn with_reset_redirect_url(mut self, url: String) -> Self {
        self.reset_redirect_url = url;
        self
    }

    #[must_use]
    pub fn with_password_min_length(mut self, length: usize) -> Self {
        self.password_min_length = length;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn reset_redirect_url(&self) -> &str {
        &self.reset_redirect_url
    }

    #[must_use]
    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    provider: Arc<dyn IdentityProvider>,
    login_schema: LoginSchemaRef,
    reset: PasswordReset,
    pending_logins: PendingLogins,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        let login_schema: LoginSchemaRef =
            Arc::new(LoginSchema::new(config.password_min_length()));
        let reset = PasswordReset::new(Arc::clone(&provider), config.reset_redirect_url());
        Self {
            config,
            provider,
            login_schema,
            reset,
            pending_logins: PendingLogins::default(),
        }
    }

    /// Swap the default login rules for another schema.
    #[must_use]
    pub fn with_login_schema(mut self, schema: LoginSchemaRef) -> Self {
        self.login_schema = schema;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    #[must_use]
    pub fn login_schema(&self) -> LoginSchemaRef {
        Arc::clone(&self.login_schema)
    }

    #[must_use]
    pub fn reset(&self) -> &PasswordReset {
        &self.reset
    }

    #[must_use]
    pub fn pending_logins(&self) -> &PendingLogins {
        &self.pending_logins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_secure_follows_frontend_scheme() {
        assert!(AuthConfig::new("https://www.wetracksales.com".to_string()).session_cookie_secure());
        assert!(!AuthConfig::new("http://localhost:3000".to_string()).session_cookie_secure());
    }

    #[test]
    fn defaults_use_fixed_reset_redirect() {
        let config = AuthConfig::new("https://www.wetracksales.com".to_string());
        assert_eq!(
            config.reset_redirect_url(),
            "https://www.wetracksales.com/update-password"
        );
        assert_eq!(config.password_min_length(), 1);
    }
}
