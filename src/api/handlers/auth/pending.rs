//! In-process registry of logins waiting on the identity provider.
//!
//! A second login for the same address while the first is in flight is
//! refused instead of reaching the provider twice.

use super::utils::normalize_email;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
pub struct PendingLogins {
    inflight: Mutex<HashSet<String>>,
}

impl PendingLogins {
    /// Claim the address. `None` means a login for it is already pending.
    pub fn begin(&self, email: &str) -> Option<PendingLogin<'_>> {
        let key = normalize_email(email);
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if !inflight.insert(key.clone()) {
            debug!("login already pending");
            return None;
        }
        Some(PendingLogin {
            registry: self,
            key,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases the address when dropped.
#[derive(Debug)]
pub struct PendingLogin<'a> {
    registry: &'a PendingLogins,
    key: String,
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        self.registry
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
