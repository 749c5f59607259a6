//! Site header navigation.
//!
//! The header only needs one bit: is there a signed-in user. That bit comes
//! from a [`SessionSnapshot`] resolved once per render, never from a constant.

use crate::error::AuthError;
use crate::provider::{IdentityProvider, ProviderUser};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    user: Option<ProviderUser>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub fn signed_in(user: ProviderUser) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&ProviderUser> {
        self.user.as_ref()
    }
}

/// Resolve the session for an optional access token.
///
/// A missing, expired or rejected token is an anonymous session. Provider
/// outages are returned so callers can tell "signed out" from "unknown".
/// # Errors
/// Returns network and unexpected provider failures.
pub async fn resolve_session(
    provider: &dyn IdentityProvider,
    access_token: Option<&str>,
) -> Result<SessionSnapshot, AuthError> {
    let Some(token) = access_token else {
        return Ok(SessionSnapshot::anonymous());
    };

    match provider.get_user(token).await {
        Ok(user) => Ok(SessionSnapshot::signed_in(user)),
        Err(AuthError::ProviderRejected { status, .. }) => {
            debug!("session token rejected by provider ({status})");
            Ok(SessionSnapshot::anonymous())
        }
        Err(err) => {
            warn!("Failed to resolve session: {err}");
            Err(err)
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HeaderActions {
    /// Account menu for the signed-in user.
    Account {
        email: Option<String>,
        account: NavLink,
        logout: NavLink,
    },
    Guest {
        login: NavLink,
        signup: NavLink,
    },
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HeaderView {
    pub brand: NavLink,
    pub theme_toggle: bool,
    pub actions: HeaderActions,
}

#[must_use]
pub fn render_header(session: &SessionSnapshot) -> HeaderView {
    let actions = match session.user() {
        Some(user) => HeaderActions::Account {
            email: user.email.clone(),
            account: NavLink::new("Conta", "/account"),
            logout: NavLink::new("Sair", "/v1/auth/logout"),
        },
        None => HeaderActions::Guest {
            login: NavLink::new("Login", "/login"),
            signup: NavLink::new("Começar", "#planos"),
        },
    };

    HeaderView {
        brand: NavLink::new("WhatsApp", "/"),
        theme_toggle: true,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Credentials, ProviderSession};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FixedProvider(Result<ProviderUser, AuthError>);

    #[async_trait]
    impl IdentityProvider for FixedProvider {
        async fn sign_in_with_password(
            &self,
            _credentials: &Credentials,
        ) -> Result<ProviderSession, AuthError> {
            Err(AuthError::Unknown("not used".to_string()))
        }

        async fn reset_password_for_email(
            &self,
            _email: &str,
            _redirect_to: &str,
        ) -> Result<(), AuthError> {
            Ok(())
        }

        async fn get_user(&self, _access_token: &str) -> Result<ProviderUser, AuthError> {
            self.0.clone()
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn alice() -> ProviderUser {
        ProviderUser {
            id: Uuid::new_v4(),
            email: Some("alice@example.com".to_string()),
        }
    }

    #[test]
    fn logged_in_header_shows_account_controls() {
        let header = render_header(&SessionSnapshot::signed_in(alice()));
        assert!(matches!(
            header.actions,
            HeaderActions::Account { ref email, .. } if email.as_deref() == Some("alice@example.com")
        ));
        assert_eq!(header.brand.href, "/");
    }

    #[test]
    fn anonymous_header_shows_login_and_signup() {
        let header = render_header(&SessionSnapshot::anonymous());
        assert_eq!(
            header.actions,
            HeaderActions::Guest {
                login: NavLink::new("Login", "/login"),
                signup: NavLink::new("Começar", "#planos"),
            }
        );
    }

    #[test]
    fn header_actions_are_tagged() -> anyhow::Result<()> {
        let value = serde_json::to_value(render_header(&SessionSnapshot::anonymous()))?;
        assert_eq!(value["actions"]["state"], "guest");
        assert_eq!(value["actions"]["login"]["href"], "/login");
        Ok(())
    }

    #[tokio::test]
    async fn no_token_is_anonymous() -> anyhow::Result<()> {
        let provider = FixedProvider(Ok(alice()));
        let session = resolve_session(&provider, None).await?;
        assert!(!session.is_logged_in());
        Ok(())
    }

    #[tokio::test]
    async fn valid_token_is_signed_in() -> anyhow::Result<()> {
        let user = alice();
        let provider = FixedProvider(Ok(user.clone()));
        let session = resolve_session(&provider, Some("token")).await?;
        assert!(session.is_logged_in());
        assert_eq!(session.user(), Some(&user));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_token_is_anonymous() -> anyhow::Result<()> {
        let provider = FixedProvider(Err(AuthError::ProviderRejected {
            status: 401,
            message: "invalid JWT".to_string(),
        }));
        let session = resolve_session(&provider, Some("expired")).await?;
        assert_eq!(session, SessionSnapshot::anonymous());
        Ok(())
    }

    #[tokio::test]
    async fn provider_outage_is_an_error() {
        let provider = FixedProvider(Err(AuthError::Network("timeout".to_string())));
        let result = resolve_session(&provider, Some("token")).await;
        assert!(matches!(result, Err(AuthError::Network(_))));
    }
}
