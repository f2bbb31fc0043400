mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use sc_server::Server;
use softwarecenter::domain::config::ApiConfig;
use softwarecenter::kernel::config::load_config;
use softwarecenter::kernel::security::{JwtIssuer, Principal};
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log = cli.init_logger()?;

    let cfg: ApiConfig = load_config(&cli.config_sources()).context("Critical: Configuration is malformed")?;

    match cli.command.unwrap_or_default() {
        Command::Serve => Server::builder().config(cfg).build().await?.run().await,
        Command::IssueToken { subject, roles, name, email } => {
            let mut principal = Principal::new(subject).with_roles(roles);
            if let Some(name) = name {
                principal = principal.with_name(name);
            }
            if let Some(email) = email {
                principal = principal.with_email(email);
            }

            let token = JwtIssuer::new(&cfg.security.jwt)?.issue(&principal)?;
            writeln!(std::io::stdout().lock(), "{token}").context("Writing token")?;
            Ok(())
        },
    }
}
