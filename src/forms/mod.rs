//! Headless form handling: field values, touched flags, field errors and a
//! single in-flight submission.
//!
//! Validation is a pluggable [`Schema`]: anything that maps raw values to a
//! validated record or a list of field errors, closures included.

pub mod controller;
pub mod login;

pub use self::controller::{FormController, SubmitOutcome};
pub use self::login::{LoginAction, LoginSchema, LoginValues};

use crate::error::{AuthError, FieldError};
use async_trait::async_trait;

pub trait Schema<I, O>: Send + Sync {
    /// Validate the whole value set.
    /// # Errors
    /// Returns every failing field, in field order.
    fn validate(&self, input: &I) -> Result<O, Vec<FieldError>>;
}

impl<I, O, F> Schema<I, O> for F
where
    F: Fn(&I) -> Result<O, Vec<FieldError>> + Send + Sync,
{
    fn validate(&self, input: &I) -> Result<O, Vec<FieldError>> {
        self(input)
    }
}

/// Raw, string-typed form values addressed by field name.
pub trait FormValues: Clone + Default + Send {
    const FIELDS: &'static [&'static str];

    fn field(&self, name: &str) -> Option<&str>;

    fn field_mut(&mut self, name: &str) -> Option<&mut String>;
}

/// The operation a form dispatches once its values are valid.
#[async_trait]
pub trait SubmitAction<T: Send + 'static>: Send + Sync {
    type Output: Send;

    async fn submit(&self, values: T) -> Result<Self::Output, AuthError>;
}
