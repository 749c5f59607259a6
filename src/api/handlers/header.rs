use super::auth::{extract_session_token, AuthState};
use crate::nav::{render_header, resolve_session, HeaderView, SessionSnapshot};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::warn;

#[utoipa::path(
    get,
    path = "/v1/header",
    responses(
        (status = 200, description = "Header navigation for the current session", body = HeaderView)
    ),
    tag = "navigation"
)]
pub async fn header(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let token = extract_session_token(&headers);
    // The header still renders when the provider is down, as a guest.
    let snapshot = resolve_session(auth_state.provider().as_ref(), token.as_deref())
        .await
        .unwrap_or_else(|err| {
            warn!("Rendering guest header, session unresolved: {err}");
            SessionSnapshot::anonymous()
        });

    (StatusCode::OK, Json(render_header(&snapshot)))
}
