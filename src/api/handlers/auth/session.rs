//! Session endpoints for cookie and bearer auth.
//!
//! The session cookie holds the identity provider's access token; the
//! provider stays the source of truth for whether it is still valid.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::error;

use super::{
    state::{AuthConfig, AuthState},
    types::{ErrorBody, SessionResponse},
    utils::{extract_session_token, SESSION_COOKIE_NAME},
};
use crate::nav::resolve_session;

/// Cookie lifetime when the provider does not say.
const DEFAULT_SESSION_TTL_SECONDS: i64 = 3600;

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session"),
        (status = 502, description = "Identity provider unreachable", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let token = extract_session_token(&headers);
    match resolve_session(auth_state.provider().as_ref(), token.as_deref()).await {
        Ok(snapshot) => match snapshot.user() {
            Some(user) => {
                let response = SessionResponse {
                    user_id: user.id.to_string(),
                    email: user.email.clone(),
                };
                (StatusCode::OK, Json(response)).into_response()
            }
            None => StatusCode::NO_CONTENT.into_response(),
        },
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(err) = auth_state.provider().sign_out(&token).await {
            error!("Failed to sign out at the identity provider: {err}");
        }
    }

    // The cookie goes even if the provider call failed.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Build an `HttpOnly` cookie for the provider access token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
    expires_in: Option<i64>,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = expires_in
        .filter(|ttl| *ttl > 0)
        .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn session_cookie_uses_provider_ttl() -> Result<()> {
        let config = AuthConfig::new("https://www.wetracksales.com".to_string());
        let cookie = session_cookie(&config, "jwt", Some(900))?;
        assert_eq!(
            cookie,
            "wetrack_session=jwt; Path=/; HttpOnly; SameSite=Lax; Max-Age=900; Secure"
        );
        Ok(())
    }

    #[test]
    fn session_cookie_falls_back_to_default_ttl() -> Result<()> {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let cookie = session_cookie(&config, "jwt", None)?;
        assert_eq!(
            cookie,
            "wetrack_session=jwt; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        let cookie = session_cookie(&config, "jwt", Some(0))?;
        assert!(cookie.to_str()?.ends_with("Max-Age=3600"));
        Ok(())
    }

    #[test]
    fn clear_session_cookie_expires_immediately() -> Result<()> {
        let config = AuthConfig::new("https://www.wetracksales.com".to_string());
        let cookie = clear_session_cookie(&config)?;
        assert_eq!(
            cookie,
            "wetrack_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
        Ok(())
    }

    #[test]
    fn session_cookie_rejects_header_breaking_tokens() {
        let config = AuthConfig::new("https://www.wetracksales.com".to_string());
        assert!(session_cookie(&config, "bad\ntoken", None).is_err());
    }
}
