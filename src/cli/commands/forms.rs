use crate::reset::DEFAULT_RESET_REDIRECT_URL;
use clap::{Arg, Command};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_RESET_REDIRECT_URL: &str = "reset-redirect-url";
pub const ARG_PASSWORD_MIN_LENGTH: &str = "password-min-length";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Public site URL, used for CORS and the cookie Secure flag")
                .default_value("https://www.wetracksales.com")
                .env("WETRACK_FRONTEND_BASE_URL"),
        )
        .arg(
            Arg::new(ARG_RESET_REDIRECT_URL)
                .long(ARG_RESET_REDIRECT_URL)
                .help("Page the password reset email links to")
                .default_value(DEFAULT_RESET_REDIRECT_URL)
                .env("WETRACK_RESET_REDIRECT_URL"),
        )
        .arg(
            Arg::new(ARG_PASSWORD_MIN_LENGTH)
                .long(ARG_PASSWORD_MIN_LENGTH)
                .help("Minimum password length accepted by the login form")
                .default_value("1")
                .env("WETRACK_PASSWORD_MIN_LENGTH")
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
}
