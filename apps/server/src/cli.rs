use clap::{Parser, Subcommand};
use sc_logger::{Format, LevelFilter, Logger, LoggerError, parse_level};
use softwarecenter::kernel::config::{ConfigSources, parse_override};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sc-server", version, about = "Software Center API")]
pub(crate) struct Cli {
    /// Base settings file; `{file}.{environment}` is layered on top.
    #[arg(long, short, global = true, default_value = "appsettings")]
    pub(crate) config: PathBuf,

    /// Host environment. Defaults to `SC_ENVIRONMENT`, then `Production`.
    #[arg(long, short, global = true)]
    pub(crate) environment: Option<String>,

    /// Overrides one setting, e.g. `--set connection_strings.software=mem://`.
    #[arg(long = "set", value_name = "KEY=VALUE", global = true, value_parser = override_pair)]
    pub(crate) overrides: Vec<(String, String)>,

    #[arg(long, global = true, default_value = "info", value_parser = level)]
    pub(crate) log_level: LevelFilter,

    /// Also write JSON logs to rolling files in this directory.
    #[arg(long, global = true)]
    pub(crate) log_dir: Option<PathBuf>,

    /// Write console logs as JSON.
    #[arg(long, global = true)]
    pub(crate) log_json: bool,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Debug, Clone, Default, Subcommand)]
pub(crate) enum Command {
    /// Run the API (default).
    #[default]
    Serve,
    /// Print a bearer token signed with the configured key.
    IssueToken {
        #[arg(long)]
        subject: String,
        /// Repeat for every role, e.g. `--role SoftwareCenter --role Manager`.
        #[arg(long = "role")]
        roles: Vec<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

impl Cli {
    pub(crate) fn config_sources(&self) -> ConfigSources {
        let mut sources = ConfigSources::new().base(&self.config);
        if let Some(environment) = &self.environment {
            sources = sources.environment(environment);
        }
        self.overrides.iter().fold(sources, |sources, (key, value)| sources.set(key, value))
    }

    pub(crate) fn init_logger(&self) -> Result<Logger, LoggerError> {
        let console = if self.log_json { Format::Json } else { Format::Compact };
        let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level(self.log_level).console(Some(console));

        match &self.log_dir {
            Some(directory) => builder.directory(directory).init(),
            None => builder.init(),
        }
    }
}

fn override_pair(raw: &str) -> Result<(String, String), String> {
    parse_override(raw).map_err(|e| e.to_string())
}

fn level(raw: &str) -> Result<LevelFilter, String> {
    parse_level(raw).map_err(|e| e.to_string())
}
