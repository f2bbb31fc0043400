use config::{Config, Environment, File, Map, Source, Value, ValueKind};
use sc_domain::config::{ConnectionStrings, MissingConnectionString};
use sc_domain::constants::PRODUCTION;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Process environment variable naming the host environment.
pub const ENVIRONMENT_VARIABLE: &str = "SC_ENVIRONMENT";
/// Prefix of configuration overrides taken from the process environment.
pub const ENV_PREFIX: &str = "SC";

const CONNECTION_STRINGS: &str = "connection_strings";

#[sc_derive::sc_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Missing configuration{}: {source}", format_context(.context))]
    MissingConnectionString { source: MissingConnectionString, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// The layered sources a configuration is assembled from.
///
/// Priority, lowest first:
/// 1. the base file (`appsettings.{toml,json,yaml}` by default, optional),
/// 2. the environment file (`appsettings.{Environment}.*`, optional),
/// 3. `SC__`-prefixed environment variables, with `__` between path segments,
/// 4. explicit `key=value` overrides.
///
/// Connection string names are canonicalized in every layer, so
/// `SC__CONNECTION_STRINGS__TECHS_API` replaces a file's `techs-api` entry.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    base: PathBuf,
    environment: Option<String>,
    overrides: Vec<(String, String)>,
    env_prefix: Cow<'static, str>,
    variables: Option<Map<String, String>>,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            base: PathBuf::from("appsettings"),
            environment: None,
            overrides: Vec::new(),
            env_prefix: Cow::Borrowed(ENV_PREFIX),
            variables: None,
        }
    }
}

impl ConfigSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base settings file. The extension may be omitted.
    #[must_use]
    pub fn base(mut self, path: impl AsRef<Path>) -> Self {
        self.base = path.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Adds a `key=value` override; keys use dotted paths (`server.port`).
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Reads environment variables from `variables` instead of the process environment.
    #[must_use]
    pub fn environment_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables = Some(variables.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Explicit name, then `SC_ENVIRONMENT`, then `Production`.
    pub fn resolve_environment(&self) -> String {
        self.environment
            .clone()
            .or_else(|| match &self.variables {
                Some(variables) => variables.get(ENVIRONMENT_VARIABLE).cloned(),
                None => std::env::var(ENVIRONMENT_VARIABLE).ok(),
            })
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| PRODUCTION.to_owned())
    }

    fn environment_file(&self, environment: &str) -> PathBuf {
        let stem = if has_config_extension(&self.base) {
            self.base.with_extension("")
        } else {
            self.base.clone()
        };
        let mut name = stem.into_os_string();
        name.push(format!(".{environment}"));
        PathBuf::from(name)
    }
}

/// Parses a `key=value` pair as given on the command line.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] when the `=` or the key is missing.
pub fn parse_override(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_owned(), value.to_owned())),
        _ => Err(ConfigError::Invalid {
            message: format!("expected key=value, got '{raw}'").into(),
            context: Some("Parsing override".into()),
        }),
    }
}

/// Builds the layered configuration and deserializes it into `T`.
///
/// The resolved environment name is written to the `environment` key, so the
/// target type can read it back.
///
/// # Errors
/// Returns an error if a present file is malformed, an override key is not a
/// valid path, or the merged values do not match `T`.
pub fn load_config<T>(sources: &ConfigSources) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let environment = sources.resolve_environment();
    let environment_file = sources.environment_file(&environment);

    let variables = Environment::with_prefix(&sources.env_prefix)
        .prefix_separator("__")
        .separator("__")
        .convert_case(config::Case::Snake)
        .source(sources.variables.clone());

    let mut builder = Config::builder()
        .add_source(CanonicalNames(File::from(sources.base.as_path()).required(false)))
        .add_source(CanonicalNames(File::from(environment_file.as_path()).required(false)))
        .add_source(CanonicalNames(variables))
        .set_override("environment", environment.as_str())
        .context("Setting host environment")?;

    for (key, value) in &sources.overrides {
        debug!(key = %key, "Applying configuration override");
        builder = builder.set_override(canonical_key(key), value.as_str()).context("Applying override")?;
    }

    info!(
        base = %sources.base.display(),
        environment_file = %environment_file.display(),
        environment = %environment,
        "Loading configuration"
    );

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Reads a required connection string as an absolute `http`/`https` base address.
///
/// A trailing `/` is added when missing, so relative joins keep the base path.
///
/// # Errors
/// Fails when the entry is missing or is not an absolute HTTP(S) URL.
pub fn require_base_url(strings: &ConnectionStrings, name: &str) -> Result<Url, ConfigError> {
    let raw = strings.require(name).context("Reading connection strings")?;

    let mut url = Url::parse(raw).map_err(|err| ConfigError::Invalid {
        message: format!("connection string '{name}' is not an absolute URL: {err}").into(),
        context: None,
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            message: format!("connection string '{name}' must be an http(s) base address").into(),
            context: None,
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// A source whose connection string names are rewritten to their canonical spelling,
/// so the entry of a later layer replaces the one of an earlier layer.
#[derive(Debug, Clone)]
struct CanonicalNames<S>(S);

impl<S> Source for CanonicalNames<S>
where
    S: Source + Clone + Send + Sync + 'static,
{
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let entries = self.0.collect()?;

        Ok(entries
            .into_iter()
            .map(|(key, mut value)| {
                if key == CONNECTION_STRINGS
                    && let ValueKind::Table(table) = &mut value.kind
                {
                    *table = std::mem::take(table)
                        .into_iter()
                        .map(|(name, entry)| (ConnectionStrings::canonical_name(&name), entry))
                        .collect();
                }
                (canonical_key(&key), value)
            })
            .collect())
    }
}

/// `connection_strings.techs-api` becomes `connection_strings.techs_api`; other keys are kept.
fn canonical_key(key: &str) -> String {
    match key.split_once('.') {
        Some((CONNECTION_STRINGS, name)) => {
            format!("{CONNECTION_STRINGS}.{}", ConnectionStrings::canonical_name(name))
        },
        _ => key.to_owned(),
    }
}

fn has_config_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "toml" | "json" | "yaml" | "yml" | "ini" | "ron" | "json5"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_file_keeps_the_directory_and_drops_the_extension() {
        let sources = ConfigSources::new().base("conf/appsettings.toml");
        assert_eq!(sources.environment_file("Development"), PathBuf::from("conf/appsettings.Development"));

        let sources = ConfigSources::new().base("appsettings");
        assert_eq!(sources.environment_file("Staging"), PathBuf::from("appsettings.Staging"));
    }

    #[test]
    fn overrides_split_on_the_first_equals_sign() {
        let (key, value) = parse_override("connection_strings.software=mem://?a=b").expect("valid override");
        assert_eq!(key, "connection_strings.software");
        assert_eq!(value, "mem://?a=b");

        assert!(parse_override("no-separator").is_err());
        assert!(parse_override("=value").is_err());
    }

    #[test]
    fn connection_string_keys_are_canonical() {
        assert_eq!(canonical_key("connection_strings.Techs-Api"), "connection_strings.techs_api");
        assert_eq!(canonical_key("server.port"), "server.port");
        assert_eq!(canonical_key("connection_strings"), "connection_strings");
    }

    #[test]
    fn injected_variables_name_the_environment() {
        let sources = ConfigSources::new().environment_variables([(ENVIRONMENT_VARIABLE, "Staging")]);
        assert_eq!(sources.resolve_environment(), "Staging");

        let sources = ConfigSources::new().environment_variables(Vec::<(String, String)>::new());
        assert_eq!(sources.resolve_environment(), PRODUCTION);
    }

    #[test]
    fn base_urls_are_normalized() {
        let strings: ConnectionStrings = [("techs-api", "http://techs.local/api")].into_iter().collect();
        let url = require_base_url(&strings, "techs-api").expect("valid url");
        assert_eq!(url.as_str(), "http://techs.local/api/");
    }

    #[test]
    fn base_urls_must_be_absolute_http() {
        let strings: ConnectionStrings =
            [("relative", "/techs"), ("mail", "mailto:someone@example.com")].into_iter().collect();

        assert!(matches!(require_base_url(&strings, "relative"), Err(ConfigError::Invalid { .. })));
        assert!(matches!(require_base_url(&strings, "mail"), Err(ConfigError::Invalid { .. })));
        assert!(matches!(
            require_base_url(&strings, "techs-api"),
            Err(ConfigError::MissingConnectionString { .. })
        ));
    }
}
