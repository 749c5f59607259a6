use crate::{
    provider::{GoTrueClient, GoTrueConfig},
    reset::PasswordReset,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub provider: GoTrueConfig,
    pub redirect_url: String,
    pub email: String,
}

/// Ask the identity provider to email a reset link, then exit.
/// # Errors
/// Returns an error if the provider client cannot be built or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let provider = Arc::new(GoTrueClient::new(args.provider)?);
    let reset = PasswordReset::new(provider, args.redirect_url);

    reset
        .try_request(&args.email)
        .await
        .with_context(|| format!("Password reset failed for {}", args.email))?;

    info!("Password reset email requested");
    println!("Password reset email requested for {}", args.email.to_lowercase());

    Ok(())
}
