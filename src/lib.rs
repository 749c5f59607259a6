//! # WeTrack account service
//!
//! `wetrack` fronts a GoTrue-compatible identity provider for the WeTrack site.
//! It never stores passwords: credentials go straight to the provider and only
//! the access token it returns is kept, in an `HttpOnly` session cookie.
//!
//! ## Login
//!
//! Login values run through a headless form controller ([`forms`]) that owns
//! field values, touched flags, field errors and a single in-flight
//! submission. Validation is a pluggable schema; the provider is called only
//! for a valid value set, exactly once per submission.
//!
//! ## Header navigation
//!
//! The site header branches on whether the current request carries a session
//! the provider still accepts ([`nav`]). An unreachable provider renders the
//! guest header.
//!
//! ## Password reset
//!
//! [`reset::PasswordReset`] asks the provider to email a reset link that lands
//! on the account update page. Callers get a success flag or a typed
//! [`error::AuthError`], never a panic.

pub mod api;
pub mod cli;
pub mod error;
pub mod forms;
pub mod nav;
pub mod provider;
pub mod reset;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_commit_hash_is_hex_or_unknown() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn app_user_agent_names_package_and_version() {
        assert_eq!(
            APP_USER_AGENT,
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        );
    }
}
