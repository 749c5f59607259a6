use super::{FormValues, Schema, SubmitAction};
use crate::error::{AuthError, FieldError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
pub enum SubmitOutcome<T> {
    Submitted(T),
    /// Local validation failed; the action was not invoked.
    Invalid(Vec<FieldError>),
    /// The action ran and failed. The error is also kept as the form's server error.
    Failed(AuthError),
    /// Another submission is still pending.
    AlreadySubmitting,
}

#[derive(Debug, Default)]
struct FormState<V> {
    values: V,
    touched: BTreeSet<String>,
    errors: BTreeMap<String, Vec<String>>,
    submitting: bool,
    server_error: Option<AuthError>,
}

pub struct FormController<V: FormValues, O> {
    schema: Arc<dyn Schema<V, O>>,
    state: Mutex<FormState<V>>,
}

impl<V: FormValues, O> FormController<V, O> {
    pub fn new(schema: impl Schema<V, O> + 'static) -> Self {
        Self::with_shared_schema(Arc::new(schema))
    }

    #[must_use]
    pub fn with_shared_schema(schema: Arc<dyn Schema<V, O>>) -> Self {
        Self {
            schema,
            state: Mutex::new(FormState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Update a field value. Returns false for a field the form does not have.
    pub fn handle_change(&self, field: &str, value: impl Into<String>) -> bool {
        let mut state = self.lock();
        match state.values.field_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Mark a field as touched and refresh the errors of every touched field.
    pub fn handle_blur(&self, field: &str) {
        if !V::FIELDS.contains(&field) {
            return;
        }

        let mut state = self.lock();
        state.touched.insert(field.to_string());

        let errors = match self.schema.validate(&state.values) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        };
        let touched = state.touched.clone();
        state.errors = group_errors(
            errors
                .into_iter()
                .filter(|error| touched.contains(&error.path)),
        );
    }

    /// Validate everything and, when valid, invoke `action` once with the
    /// validated values.
    pub async fn submit<A>(&self, action: &A) -> SubmitOutcome<A::Output>
    where
        O: Send + 'static,
        A: SubmitAction<O> + ?Sized,
    {
        let validated = {
            let mut state = self.lock();
            if state.submitting {
                debug!("submit ignored, a submission is pending");
                return SubmitOutcome::AlreadySubmitting;
            }

            state
                .touched
                .extend(V::FIELDS.iter().map(|field| (*field).to_string()));

            match self.schema.validate(&state.values) {
                Ok(validated) => {
                    state.errors.clear();
                    state.server_error = None;
                    state.submitting = true;
                    validated
                }
                Err(errors) => {
                    state.errors = group_errors(errors.iter().cloned());
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        let _pending = PendingSubmit { state: &self.state };

        match action.submit(validated).await {
            Ok(output) => SubmitOutcome::Submitted(output),
            Err(err) => {
                self.lock().server_error = Some(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    #[must_use]
    pub fn values(&self) -> V {
        self.lock().values.clone()
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<String> {
        self.lock().values.field(field).map(str::to_string)
    }

    #[must_use]
    pub fn errors(&self, field: &str) -> Vec<String> {
        self.lock().errors.get(field).cloned().unwrap_or_default()
    }

    /// The message an input shows: the first error of the field.
    #[must_use]
    pub fn first_error(&self, field: &str) -> Option<String> {
        self.lock()
            .errors
            .get(field)
            .and_then(|messages| messages.first().cloned())
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.lock().errors.is_empty()
    }

    #[must_use]
    pub fn is_touched(&self, field: &str) -> bool {
        self.lock().touched.contains(field)
    }

    /// True while an action is in flight; the submit control stays disabled.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    #[must_use]
    pub fn server_error(&self) -> Option<AuthError> {
        self.lock().server_error.clone()
    }
}

// Clears the submitting flag even if the submit future is dropped mid-flight.
struct PendingSubmit<'a, V> {
    state: &'a Mutex<FormState<V>>,
}

impl<V> Drop for PendingSubmit<'_, V> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submitting = false;
    }
}

fn group_errors(errors: impl IntoIterator<Item = FieldError>) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for error in errors {
        grouped.entry(error.path).or_default().push(error.message);
    }
    grouped
}
