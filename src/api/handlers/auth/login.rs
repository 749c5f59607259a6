//! Password login through the identity provider.
//!
//! The request runs through the same form controller a client-side form
//! would: values go in untouched, the login schema decides, and the provider
//! is only called for a valid value set.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

use super::{
    session::session_cookie,
    state::AuthState,
    types::{auth_error_response, ErrorBody, LoginRequest, SessionResponse},
};
use crate::error::AuthError;
use crate::forms::{
    login::{FIELD_EMAIL, FIELD_PASSWORD},
    FormController, LoginAction, LoginValues, SubmitOutcome,
};
use crate::provider::Credentials;

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = SessionResponse),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Credentials rejected by the identity provider", body = ErrorBody),
        (status = 409, description = "A login for this email is already pending"),
        (status = 422, description = "Validation failed", body = ErrorBody),
        (status = 429, description = "Rate limited by the identity provider", body = ErrorBody),
        (status = 502, description = "Identity provider unreachable", body = ErrorBody),
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let Some(_pending) = auth_state.pending_logins().begin(&request.email) else {
        return login_in_progress();
    };

    let form: FormController<LoginValues, Credentials> =
        FormController::with_shared_schema(auth_state.login_schema());
    form.handle_change(FIELD_EMAIL, request.email);
    form.handle_change(FIELD_PASSWORD, request.password);

    let action = LoginAction::new(Arc::clone(auth_state.provider()));
    let outcome = form
        .submit(&action)
        .instrument(tracing::info_span!("auth.login"))
        .await;

    match outcome {
        SubmitOutcome::Submitted(session) => {
            info!(user_id = %session.user.id, "Login succeeded");
            let mut headers = HeaderMap::new();
            match session_cookie(auth_state.config(), &session.access_token, session.expires_in) {
                Ok(cookie) => {
                    headers.insert(SET_COOKIE, cookie);
                }
                Err(err) => {
                    error!("Failed to build session cookie: {err}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
            let response = SessionResponse {
                user_id: session.user.id.to_string(),
                email: session.user.email,
            };
            (StatusCode::OK, headers, Json(response)).into_response()
        }
        SubmitOutcome::Invalid(errors) => {
            debug!("Login form invalid ({} field errors)", errors.len());
            auth_error_response(&AuthError::Validation(errors), None)
        }
        SubmitOutcome::Failed(err) => {
            warn!("Login failed: {err}");
            auth_error_response(&err, Some(StatusCode::UNAUTHORIZED))
        }
        // Each request owns a fresh controller; overlapping logins are caught by
        // `PendingLogins` above, so this only mirrors that answer.
        SubmitOutcome::AlreadySubmitting => login_in_progress(),
    }
}

fn login_in_progress() -> Response {
    (StatusCode::CONFLICT, "Login already in progress".to_string()).into_response()
}
