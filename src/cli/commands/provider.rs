use clap::{Arg, Command};

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_PROVIDER_API_KEY: &str = "provider-api-key";
pub const ARG_PROVIDER_TIMEOUT_SECONDS: &str = "provider-timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long(ARG_PROVIDER_URL)
                .help("Identity provider base URL, e.g. https://<project>.supabase.co")
                .env("WETRACK_PROVIDER_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_API_KEY)
                .long(ARG_PROVIDER_API_KEY)
                .help("Identity provider public (anon) API key")
                .env("WETRACK_PROVIDER_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_TIMEOUT_SECONDS)
                .long(ARG_PROVIDER_TIMEOUT_SECONDS)
                .help("Timeout for each identity provider request")
                .default_value("10")
                .env("WETRACK_PROVIDER_TIMEOUT_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
