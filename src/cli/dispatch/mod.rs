//! Map validated command-line matches to an action.

use crate::cli::{
    actions::{server::Args, Action},
    globals::{Environment, GlobalArgs},
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    validate_dsn(&dsn)?;

    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .filter(|secret| !secret.is_empty())
        .cloned()
        .context("missing required argument: --jwt-secret")?;

    let mut globals = GlobalArgs::new(SecretString::from(jwt_secret));

    if let Some(ttl) = matches.get_one::<i64>("token-ttl") {
        globals.token_ttl_seconds = *ttl;
    }

    if let Some(cost) = matches.get_one::<u32>("hash-cost") {
        globals.hash_cost = *cost;
    }

    if let Some(seconds) = matches.get_one::<u64>("call-timeout") {
        globals.call_timeout = (*seconds > 0).then(|| Duration::from_secs(*seconds));
    }

    if let Some(environment) = matches.get_one::<String>("env") {
        globals.environment = environment.parse::<Environment>().map_err(|e| anyhow!(e))?;
    }

    globals.frontend_origin = matches.get_one::<String>("frontend-origin").cloned();
    globals.conceal_unknown_accounts = matches.get_flag("conceal-unknown-accounts");

    Ok(Action::Server(Args { port, dsn, globals }))
}

fn validate_dsn(dsn: &str) -> Result<()> {
    let url = Url::parse(dsn).context("invalid --dsn")?;

    match url.scheme() {
        "postgres" | "postgresql" => Ok(()),
        scheme => Err(anyhow!("unsupported database scheme: {scheme}")),
    }
}
