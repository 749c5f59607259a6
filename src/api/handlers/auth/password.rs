use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{
    state::AuthState,
    types::{ErrorBody, ResetResponse},
};
use crate::reset::ResetRequest;

#[utoipa::path(
    post,
    path = "/v1/auth/password/reset",
    request_body = ResetRequest,
    responses(
        (status = 202, description = "Reset email requested", body = ResetResponse),
        (status = 400, description = "Missing payload"),
        (status = 429, description = "Rate limited by the identity provider", body = ErrorBody),
        (status = 502, description = "Identity provider unreachable", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn reset_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetRequest>>,
) -> impl IntoResponse {
    let request: ResetRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state.reset().try_request(&request.email).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(ResetResponse { sent: true })).into_response(),
        Err(err) => err.into_response(),
    }
}
