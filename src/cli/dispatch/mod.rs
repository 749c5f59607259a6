use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::{reset_password, server, Action};
use crate::cli::commands::{self, forms, provider};
use crate::provider::GoTrueConfig;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use url::Url;

/// Build the action for the parsed arguments.
/// # Errors
/// Returns an error if required arguments are missing or a URL is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let provider = provider_config(matches)?;
    let reset_redirect_url = http_url(matches, forms::ARG_RESET_REDIRECT_URL)?;

    if let Some(sub_m) = matches.subcommand_matches(commands::CMD_RESET_PASSWORD) {
        let email = sub_m
            .get_one::<String>(commands::ARG_EMAIL)
            .cloned()
            .context("missing required argument: --email")?;
        return Ok(Action::ResetPassword(reset_password::Args {
            provider,
            redirect_url: reset_redirect_url,
            email,
        }));
    }

    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let frontend_base_url = http_url(matches, forms::ARG_FRONTEND_BASE_URL)?;
    let password_min_length = matches
        .get_one::<u16>(forms::ARG_PASSWORD_MIN_LENGTH)
        .copied()
        .map_or(1, usize::from);

    let auth = AuthConfig::new(frontend_base_url)
        .with_reset_redirect_url(reset_redirect_url)
        .with_password_min_length(password_min_length);

    Ok(Action::Server(server::Args {
        port,
        provider,
        auth,
    }))
}

fn provider_config(matches: &clap::ArgMatches) -> Result<GoTrueConfig> {
    let url = http_url(matches, provider::ARG_PROVIDER_URL)?;
    let base_url = Url::parse(&url).context("invalid WETRACK_PROVIDER_URL")?;
    let api_key = matches
        .get_one::<String>(provider::ARG_PROVIDER_API_KEY)
        .cloned()
        .context("missing required argument: --provider-api-key")?;
    let timeout_seconds = matches
        .get_one::<u64>(provider::ARG_PROVIDER_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(10);

    Ok(GoTrueConfig::new(base_url, SecretString::from(api_key)).with_timeout_seconds(timeout_seconds))
}

/// Read a URL argument and require an http(s) scheme and a host.
fn http_url(matches: &clap::ArgMatches, id: &str) -> Result<String> {
    let value = matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))?;
    let parsed = Url::parse(&value).with_context(|| format!("invalid --{id}: {value}"))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(anyhow!("--{id} must be an http(s) URL with a host: {value}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(extra: &[&str]) -> Result<clap::ArgMatches> {
        let mut args = vec![
            "wetrack",
            "--provider-url",
            "https://project.supabase.co",
            "--provider-api-key",
            "anon-key",
        ];
        args.extend_from_slice(extra);
        Ok(commands::new().try_get_matches_from(args)?)
    }

    #[test]
    fn server_action_by_default() -> Result<()> {
        let action = handler(&matches(&[
            "--port",
            "9090",
            "--frontend-base-url",
            "http://localhost:3000",
            "--password-min-length",
            "8",
            "--provider-timeout-seconds",
            "4",
        ])?)?;
        let Action::Server(args) = action else {
            return Err(anyhow!("expected server action"));
        };
        assert_eq!(args.port, 9090);
        assert_eq!(args.auth.frontend_base_url(), "http://localhost:3000");
        assert_eq!(args.auth.password_min_length(), 8);
        assert!(!args.auth.session_cookie_secure());
        assert_eq!(args.provider.base_url().as_str(), "https://project.supabase.co/");
        assert_eq!(args.provider.timeout().as_secs(), 4);
        Ok(())
    }

    #[test]
    fn reset_password_action_keeps_email_as_typed() -> Result<()> {
        let action = handler(&matches(&["reset-password", "--email", "User@Example.com"])?)?;
        let Action::ResetPassword(args) = action else {
            return Err(anyhow!("expected reset-password action"));
        };
        assert_eq!(args.email, "User@Example.com");
        assert_eq!(
            args.redirect_url,
            "https://www.wetracksales.com/update-password"
        );
        Ok(())
    }

    #[test]
    fn rejects_non_http_urls() -> Result<()> {
        assert!(handler(&matches(&["--frontend-base-url", "ftp://example.com"])?).is_err());
        assert!(handler(&matches(&["--reset-redirect-url", "not a url"])?).is_err());
        let bad_provider = commands::new().try_get_matches_from([
            "wetrack",
            "--provider-url",
            "mailto:team@wetracksales.com",
            "--provider-api-key",
            "anon-key",
        ])?;
        assert!(handler(&bad_provider).is_err());
        Ok(())
    }
}
