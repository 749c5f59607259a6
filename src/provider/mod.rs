//! Identity provider seam.
//!
//! The provider owns user credentials and delivers password reset emails; this
//! service never stores either. `GoTrueClient` talks to a GoTrue-compatible
//! auth API over HTTP, tests plug in their own implementation.

pub mod gotrue;

pub use self::gotrue::{GoTrueClient, GoTrueConfig};

use crate::error::AuthError;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Validated login values, consumed once by the login action.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: ProviderUser,
}

impl fmt::Debug for ProviderSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ProviderSession")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<ProviderSession, AuthError>;

    /// Ask the provider to email a reset link that lands on `redirect_to`.
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Reachability probe used by `/health`.
    async fn ping(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
