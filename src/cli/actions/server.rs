use crate::{
    api::{self, handlers::auth::{AuthConfig, AuthState}},
    provider::{GoTrueClient, GoTrueConfig},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub provider: GoTrueConfig,
    pub auth: AuthConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let provider = Arc::new(GoTrueClient::new(args.provider)?);
    let auth_state = Arc::new(AuthState::new(args.auth, provider));

    api::new(args.port, auth_state).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("provider_url", args.provider.base_url().to_string()),
        (
            "provider_timeout",
            format!("{}s", args.provider.timeout().as_secs()),
        ),
        ("frontend_base_url", args.auth.frontend_base_url().to_string()),
        ("reset_redirect_url", args.auth.reset_redirect_url().to_string()),
        (
            "password_min_length",
            args.auth.password_min_length().to_string(),
        ),
    ];
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        message.push_str(&format!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
