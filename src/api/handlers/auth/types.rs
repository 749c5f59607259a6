//! Request/response types for auth endpoints.

use crate::error::{AuthError, AuthErrorKind, FieldError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetResponse {
    pub sent: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub kind: AuthErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorBody {
    /// User-facing body. Provider details stay in the logs.
    #[must_use]
    pub fn from_error(err: &AuthError) -> Self {
        let message = match err {
            AuthError::Validation(_) => "Please correct the highlighted fields",
            AuthError::Network(_) => "Could not reach the identity provider",
            AuthError::ProviderRejected { status: 429, .. } => "Too many attempts, try again later",
            AuthError::ProviderRejected { .. } => "The identity provider rejected the request",
            AuthError::Unknown(_) => "Something went wrong, please try again",
        };
        Self {
            kind: err.kind(),
            message: message.to_string(),
            errors: err.field_errors().to_vec(),
        }
    }
}

/// Map an [`AuthError`] to a JSON response.
///
/// `rejected_status` replaces the upstream status of a provider rejection,
/// except for 429 which is always kept.
pub(crate) fn auth_error_response(
    err: &AuthError,
    rejected_status: Option<StatusCode>,
) -> Response {
    let status = match err {
        AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::Network(_) => StatusCode::BAD_GATEWAY,
        AuthError::ProviderRejected { status: 429, .. } => StatusCode::TOO_MANY_REQUESTS,
        AuthError::ProviderRejected { status, .. } => rejected_status.unwrap_or_else(|| {
            StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_REQUEST)
        }),
        AuthError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody::from_error(err))).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        auth_error_response(&self, None)
    }
}
