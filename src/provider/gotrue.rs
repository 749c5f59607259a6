//! HTTP client for a GoTrue-compatible auth API (`/auth/v1/*`).

use super::{Credentials, IdentityProvider, ProviderSession, ProviderUser};
use crate::{error::AuthError, APP_USER_AGENT};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

#[derive(Clone, Debug)]
pub struct GoTrueConfig {
    base_url: Url,
    api_key: SecretString,
    timeout: Duration,
}

impl GoTrueConfig {
    /// Default timeout is 10 seconds per request.
    #[must_use]
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds.max(1));
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Clone, Debug)]
pub struct GoTrueClient {
    client: Client,
    config: GoTrueConfig,
}

impl GoTrueClient {
    /// Build the client.
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn new(config: GoTrueConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context("Failed to build identity provider HTTP client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{path}",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }

    fn post(&self, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", self.config.api_key.expose_secret())
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<ProviderSession, AuthError> {
        let response = self
            .post("token", self.config.api_key.expose_secret())
            .query(&[("grant_type", "password")])
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password.expose_secret(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        response.json::<ProviderSession>().await.map_err(|e| {
            error!("Failed to decode provider session: {e}");

            AuthError::Unknown(format!("Invalid session payload: {e}"))
        })
    }

    #[instrument(skip(self))]
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .post("recover", self.config.api_key.expose_secret())
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Reset email accepted by provider");
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", self.config.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        response
            .json::<ProviderUser>()
            .await
            .map_err(|e| AuthError::Unknown(format!("Invalid user payload: {e}")))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self.post("logout", access_token).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }

    // GoTrue answers `GET /auth/v1/health` without a session.
    #[instrument(skip_all)]
    async fn ping(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .header("apikey", self.config.api_key.expose_secret())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }
}

/// Turn a non-success provider response into an error kind.
/// 4xx answers are rejections; anything else is unexpected.
async fn rejection(response: Response) -> AuthError {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    debug!("provider answered {}: {}", status, message);

    classify(status, message)
}

fn classify(status: StatusCode, message: String) -> AuthError {
    if status.is_client_error() {
        AuthError::ProviderRejected {
            status: status.as_u16(),
            message,
        }
    } else {
        AuthError::Unknown(format!("{status}: {message}"))
    }
}

// GoTrue versions disagree on the error field name.
fn error_message(body: &Value) -> Option<String> {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_ID: &str = "8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e";

    fn client_for(server: &MockServer) -> anyhow::Result<GoTrueClient> {
        let config = GoTrueConfig::new(
            Url::parse(&server.uri())?,
            SecretString::from("anon-key".to_string()),
        )
        .with_timeout_seconds(2);
        GoTrueClient::new(config)
    }

    #[test]
    fn error_message_prefers_msg() {
        let body = json!({"msg": "first", "error": "second"});
        assert_eq!(error_message(&body), Some("first".to_string()));
        let body = json!({"error": "invalid_grant", "error_description": "Invalid login credentials"});
        assert_eq!(
            error_message(&body),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(error_message(&Value::Null), None);
    }

    #[test]
    fn classify_splits_client_and_server_errors() {
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string()),
            AuthError::ProviderRejected {
                status: 429,
                message: "slow down".to_string()
            }
        );
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            AuthError::Unknown(_)
        ));
    }

    #[test]
    fn endpoint_trims_trailing_slash() -> anyhow::Result<()> {
        let config = GoTrueConfig::new(
            Url::parse("https://project.supabase.co/")?,
            SecretString::from("key".to_string()),
        );
        let client = GoTrueClient::new(config)?;
        assert_eq!(
            client.endpoint("recover"),
            "https://project.supabase.co/auth/v1/recover"
        );
        Ok(())
    }

    #[test]
    fn timeout_has_a_floor() -> anyhow::Result<()> {
        let config = GoTrueConfig::new(
            Url::parse("https://project.supabase.co")?,
            SecretString::from("key".to_string()),
        )
        .with_timeout_seconds(0);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        Ok(())
    }

    #[tokio::test]
    async fn reset_sends_email_and_redirect() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param(
                "redirect_to",
                "https://www.wetracksales.com/update-password",
            ))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({"email": "user@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client
            .reset_password_for_email(
                "user@example.com",
                "https://www.wetracksales.com/update-password",
            )
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn reset_rejection_keeps_status_and_message() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"code": 429, "msg": "Email rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client
            .reset_password_for_email("user@example.com", "https://example.com/update")
            .await;
        assert_eq!(
            result,
            Err(AuthError::ProviderRejected {
                status: 429,
                message: "Email rate limit exceeded".to_string()
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_returns_session() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(
                json!({"email": "Alice@Example.com", "password": "S3cret!"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {"id": USER_ID, "email": "alice@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let session = client
            .sign_in_with_password(&Credentials::new("Alice@Example.com", "S3cret!"))
            .await?;
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.id.to_string(), USER_ID);
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_invalid_credentials_is_rejected() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client
            .sign_in_with_password(&Credentials::new("alice@example.com", "wrong"))
            .await;
        assert!(matches!(
            result,
            Err(AuthError::ProviderRejected { status: 400, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn get_user_uses_bearer_token() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": USER_ID, "email": "alice@example.com"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let user = client.get_user("user-token").await?;
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        Ok(())
    }

    #[tokio::test]
    async fn server_error_is_unknown() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        assert!(matches!(client.ping().await, Err(AuthError::Unknown(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_provider_is_network_error() -> anyhow::Result<()> {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let config = GoTrueConfig::new(
            Url::parse("http://127.0.0.1:9")?,
            SecretString::from("key".to_string()),
        )
        .with_timeout_seconds(1);
        let client = GoTrueClient::new(config)?;
        let result = client.reset_password_for_email("a@b.co", "https://x.y/z").await;
        assert!(matches!(result, Err(AuthError::Network(_))));
        Ok(())
    }
}
