//! Closed set of failures surfaced by the login and password reset flows.
//!
//! Local validation failures carry their field errors so a client can attach
//! them to inputs. Everything coming back from the identity provider collapses
//! into one of three kinds; callers pick a message per kind instead of a
//! single generic banner.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A validation message attached to one form input.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    Validation,
    Network,
    ProviderRejected,
    Unknown,
}

impl AuthErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::ProviderRejected => "provider_rejected",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    Validation(Vec<FieldError>),
    Network(String),
    ProviderRejected { status: u16, message: String },
    Unknown(String),
}

impl AuthError {
    #[must_use]
    pub const fn kind(&self) -> AuthErrorKind {
        match self {
            Self::Validation(_) => AuthErrorKind::Validation,
            Self::Network(_) => AuthErrorKind::Network,
            Self::ProviderRejected { .. } => AuthErrorKind::ProviderRejected,
            Self::Unknown(_) => AuthErrorKind::Unknown,
        }
    }

    /// Field errors, empty for anything but a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => {
                write!(formatter, "Validation failed")?;
                if let Some(first) = errors.first() {
                    write!(formatter, ": {} {}", first.path, first.message)?;
                }
                Ok(())
            }
            Self::Network(message) => write!(formatter, "Network error: {message}"),
            Self::ProviderRejected { status, message } => {
                write!(formatter, "Identity provider rejected the request ({status}): {message}")
            }
            Self::Unknown(message) => write!(formatter, "Unexpected error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self::Network(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
