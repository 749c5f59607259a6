//! Small helpers for auth request handling.

use axum::http::{header::AUTHORIZATION, HeaderMap};

pub(super) const SESSION_COOKIE_NAME: &str = "wetrack_session";

/// Normalize an email for in-flight bookkeeping.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Read the provider access token from a bearer header or the session cookie.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    value.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        (key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty())
            .then(|| val.trim().to_string())
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
