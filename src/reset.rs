//! Password reset: ask the identity provider to email a reset link.

use crate::error::AuthError;
use crate::provider::IdentityProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

/// Where the emailed link lands: the account update page.
pub const DEFAULT_RESET_REDIRECT_URL: &str = "https://www.wetracksales.com/update-password";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Clone)]
pub struct PasswordReset {
    provider: Arc<dyn IdentityProvider>,
    redirect_to: String,
}

impl PasswordReset {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, redirect_to: impl Into<String>) -> Self {
        Self {
            provider,
            redirect_to: redirect_to.into(),
        }
    }

    #[must_use]
    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    /// Send the reset email, reporting only whether the provider accepted it.
    pub async fn request(&self, email: &str) -> bool {
        self.try_request(email).await.is_ok()
    }

    /// Send the reset email.
    ///
    /// The address is lower-cased and otherwise passed as is; format checks
    /// are left to the provider.
    /// # Errors
    /// Returns the provider failure kind.
    #[instrument(skip(self))]
    pub async fn try_request(&self, email: &str) -> Result<(), AuthError> {
        let email = email.to_lowercase();

        match self
            .provider
            .reset_password_for_email(&email, &self.redirect_to)
            .await
        {
            Ok(()) => {
                info!("Password reset email requested");
                Ok(())
            }
            Err(err) => {
                error!("Password reset request failed: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Credentials, ProviderSession, ProviderUser};
    use async_trait::async_trait;
    use std::sync::{Mutex, PoisonError};

    #[derive(Default)]
    struct RecordingProvider {
        resets: Mutex<Vec<(String, String)>>,
        fail_with: Option<AuthError>,
    }

    #[async_trait]
    impl IdentityProvider for RecordingProvider {
        async fn sign_in_with_password(
            &self,
            _credentials: &Credentials,
        ) -> Result<ProviderSession, AuthError> {
            Err(AuthError::Unknown("not used".to_string()))
        }

        async fn reset_password_for_email(
            &self,
            email: &str,
            redirect_to: &str,
        ) -> Result<(), AuthError> {
            self.resets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((email.to_string(), redirect_to.to_string()));
            self.fail_with.clone().map_or(Ok(()), Err)
        }

        async fn get_user(&self, _access_token: &str) -> Result<ProviderUser, AuthError> {
            Err(AuthError::Unknown("not used".to_string()))
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn request_lowercases_email_and_uses_fixed_redirect() {
        let provider = Arc::new(RecordingProvider::default());
        let reset = PasswordReset::new(provider.clone(), DEFAULT_RESET_REDIRECT_URL);

        assert!(reset.request("USER@Example.com").await);

        let resets = provider.resets.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(
            *resets,
            vec![(
                "user@example.com".to_string(),
                "https://www.wetracksales.com/update-password".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn request_does_not_trim_or_validate() {
        let provider = Arc::new(RecordingProvider::default());
        let reset = PasswordReset::new(provider.clone(), DEFAULT_RESET_REDIRECT_URL);

        assert!(reset.request(" Not An Email ").await);

        let resets = provider.resets.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(resets[0].0, " not an email ");
    }

    #[tokio::test]
    async fn provider_error_returns_false() {
        for err in [
            AuthError::Network("connection reset".to_string()),
            AuthError::ProviderRejected {
                status: 429,
                message: "rate limited".to_string(),
            },
            AuthError::Unknown("500".to_string()),
        ] {
            let provider = Arc::new(RecordingProvider {
                fail_with: Some(err.clone()),
                ..RecordingProvider::default()
            });
            let reset = PasswordReset::new(provider, DEFAULT_RESET_REDIRECT_URL);

            assert!(!reset.request("user@example.com").await);
            assert_eq!(reset.try_request("user@example.com").await, Err(err));
        }
    }
}
