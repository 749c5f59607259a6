use crate::cli::actions::{reset_password, server, Action};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
        Action::ResetPassword(args) => reset_password::execute(args).await,
    }
}
