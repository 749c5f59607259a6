//! Auth handlers and supporting modules.
//!
//! Credentials never stay here: login forwards them to the identity provider
//! and keeps only the access token it hands back, in an `HttpOnly` cookie.
//!
//! ## Concurrent logins
//!
//! A login for an address that already has one in flight answers
//! `409 Conflict` without reaching the provider.

pub mod login;
pub mod password;
mod pending;
pub mod session;
mod state;
pub(crate) mod types;
mod utils;

pub use pending::{PendingLogin, PendingLogins};
pub use state::{AuthConfig, AuthState, LoginSchemaRef};
pub(crate) use utils::extract_session_token;
