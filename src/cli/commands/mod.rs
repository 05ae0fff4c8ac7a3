pub mod logging;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        PossibleValuesParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("idgate")
        .about("Account registration and credential issuance")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("IDGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("IDGATE_DSN")
                .required(true),
        )
        .arg(
            Arg::new("jwt-secret")
                .long("jwt-secret")
                .help("Key used to sign access tokens")
                .env("IDGATE_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("token-ttl")
                .long("token-ttl")
                .help("Access token lifetime in seconds")
                .default_value("604800")
                .env("IDGATE_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new("hash-cost")
                .long("hash-cost")
                .help("bcrypt cost factor")
                .default_value("10")
                .env("IDGATE_HASH_COST")
                .value_parser(clap::value_parser!(u32).range(4..=31)),
        )
        .arg(
            Arg::new("call-timeout")
                .long("call-timeout")
                .help("Timeout in seconds for database and hashing calls, 0 disables")
                .default_value("10")
                .env("IDGATE_CALL_TIMEOUT")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("env")
                .long("env")
                .help("Runtime environment, development includes error details in responses")
                .default_value("production")
                .env("IDGATE_ENV")
                .value_parser(PossibleValuesParser::new(["development", "production"])),
        )
        .arg(
            Arg::new("frontend-origin")
                .long("frontend-origin")
                .help("Allowed CORS origin, any origin when not set")
                .env("IDGATE_FRONTEND_ORIGIN"),
        )
        .arg(
            Arg::new("conceal-unknown-accounts")
                .long("conceal-unknown-accounts")
                .help("Answer logins for unknown emails with 401 Invalid credentials")
                .env("IDGATE_CONCEAL_UNKNOWN_ACCOUNTS")
                .action(ArgAction::SetTrue),
        );

    logging::with_args(command)
}
