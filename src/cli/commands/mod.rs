pub mod auth;
pub mod database;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!(
            "{} - {}",
            env!("CARGO_PKG_VERSION"),
            crate::vestibule::GIT_COMMIT_HASH
        )
        .into_boxed_str(),
    );

    let command = Command::new("vestibule")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("VESTIBULE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long("request-timeout")
                .help("Seconds before an in-flight request is abandoned")
                .default_value("5")
                .env("VESTIBULE_REQUEST_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        );

    let command = database::with_args(command);
    let command = auth::with_args(command);
    logging::with_args(command)
}
