pub mod forms;
pub mod logging;
pub mod provider;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_RESET_PASSWORD: &str = "reset-password";
pub const ARG_EMAIL: &str = "email";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("wetrack")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("WETRACK_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .subcommand(
            Command::new(CMD_RESET_PASSWORD)
                .about("Email a password reset link and exit")
                .arg(
                    Arg::new(ARG_EMAIL)
                        .long(ARG_EMAIL)
                        .help("Account email address")
                        .required(true),
                ),
        );

    let command = provider::with_args(command);
    let command = forms::with_args(command);
    logging::with_args(command)
}
