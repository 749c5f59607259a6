use super::{FormValues, Schema, SubmitAction};
use crate::error::{AuthError, FieldError};
use crate::provider::{Credentials, IdentityProvider, ProviderSession};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";

#[derive(Clone, Debug, Default)]
pub struct LoginValues {
    pub email: String,
    pub password: String,
}

impl FormValues for LoginValues {
    const FIELDS: &'static [&'static str] = &[FIELD_EMAIL, FIELD_PASSWORD];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            FIELD_EMAIL => Some(&self.email),
            FIELD_PASSWORD => Some(&self.password),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            FIELD_EMAIL => Some(&mut self.email),
            FIELD_PASSWORD => Some(&mut self.password),
            _ => None,
        }
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Default login rules: a well-formed email and a password of at least
/// `password_min_length` characters.
#[derive(Clone, Copy, Debug)]
pub struct LoginSchema {
    password_min_length: usize,
}

impl LoginSchema {
    #[must_use]
    pub fn new(password_min_length: usize) -> Self {
        Self {
            password_min_length: password_min_length.max(1),
        }
    }

    #[must_use]
    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }
}

impl Default for LoginSchema {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Schema<LoginValues, Credentials> for LoginSchema {
    fn validate(&self, input: &LoginValues) -> Result<Credentials, Vec<FieldError>> {
        let mut errors = Vec::new();

        if input.email.is_empty() {
            errors.push(FieldError::new(FIELD_EMAIL, "Email is required"));
        } else if !valid_email(&input.email) {
            errors.push(FieldError::new(FIELD_EMAIL, "Invalid email address"));
        }

        if input.password.is_empty() {
            errors.push(FieldError::new(FIELD_PASSWORD, "Password is required"));
        } else if input.password.chars().count() < self.password_min_length {
            errors.push(FieldError::new(
                FIELD_PASSWORD,
                format!(
                    "Password must be at least {} characters",
                    self.password_min_length
                ),
            ));
        }

        if errors.is_empty() {
            // Values go out exactly as typed.
            Ok(Credentials::new(input.email.clone(), input.password.clone()))
        } else {
            Err(errors)
        }
    }
}

/// Login through the identity provider's password grant.
#[derive(Clone)]
pub struct LoginAction {
    provider: Arc<dyn IdentityProvider>,
}

impl LoginAction {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SubmitAction<Credentials> for LoginAction {
    type Output = ProviderSession;

    async fn submit(&self, values: Credentials) -> Result<ProviderSession, AuthError> {
        self.provider.sign_in_with_password(&values).await
    }
}
