use crate::constants::{DEVELOPMENT, PRODUCTION};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything the service reads from its configuration sources.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub environment: HostEnvironment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub connection_strings: ConnectionStrings,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Name of the hosting environment (`Development`, `Staging`, `Production`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct HostEnvironment(String);

impl HostEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    pub fn is_development(&self) -> bool {
        self.is(DEVELOPMENT)
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self(PRODUCTION.to_owned())
    }
}

impl fmt::Display for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Document store session settings. The endpoint comes from the `software`
/// connection string.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// Root credentials; engines like `mem://` run without them.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
}

/// Bearer token validation. `ttl_seconds` only applies to tokens minted locally.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub signing_key: String,
    pub issuer: Option<String>,
    pub audiences: Vec<String>,
    pub clock_skew_seconds: u64,
    pub ttl_seconds: u64,
}

/// Named connection strings.
///
/// Names are stored in canonical form (ASCII lowercase, `-` written as `_`), so
/// `techs-api` and `SC__CONNECTION_STRINGS__TECHS_API` address the same entry and a
/// later insert replaces an earlier one.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct ConnectionStrings(BTreeMap<String, String>);

/// A required connection string is absent or blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("connection string '{0}' is not configured")]
pub struct MissingConnectionString(pub String);

impl ConnectionStrings {
    /// The canonical spelling of a connection string name.
    pub fn canonical_name(name: &str) -> String {
        name.trim().chars().map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() }).collect()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(Self::canonical_name(name.as_ref()), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(&Self::canonical_name(name))
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// # Errors
    /// Returns [`MissingConnectionString`] when the name is absent or its value is blank.
    pub fn require(&self, name: &str) -> Result<&str, MissingConnectionString> {
        self.get(name).ok_or_else(|| MissingConnectionString(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ConnectionStrings {
    fn from(entries: BTreeMap<String, String>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ConnectionStrings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut strings = Self::default();
        for (name, value) in iter {
            strings.insert(name, value);
        }
        strings
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8080, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { namespace: "softwarecenter".to_owned(), database: "software".to_owned(), credentials: None }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            issuer: None,
            audiences: Vec::new(),
            clock_skew_seconds: 60,
            ttl_seconds: 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_names_are_normalized() {
        let strings: ConnectionStrings = [("TECHS_API", "http://techs"), ("software", "mem://")].into_iter().collect();

        assert_eq!(strings.get("techs-api"), Some("http://techs"));
        assert_eq!(strings.get("Software"), Some("mem://"));
        assert_eq!(strings.get("other"), None);
    }

    #[test]
    fn later_spellings_replace_earlier_ones() {
        let mut strings = ConnectionStrings::default();
        strings.insert("techs-api", "http://from-file/");
        strings.insert("techs_api", "http://from-env/");

        assert_eq!(strings.len(), 1);
        assert_eq!(strings.get("techs-api"), Some("http://from-env/"));
        assert_eq!(ConnectionStrings::canonical_name(" Techs-API "), "techs_api");
    }

    #[test]
    fn blank_connection_strings_count_as_missing() {
        let strings: ConnectionStrings = [("software", "   ")].into_iter().collect();

        assert_eq!(strings.require("software"), Err(MissingConnectionString("software".to_owned())));
    }

    #[test]
    fn environment_names_compare_case_insensitively() {
        assert!(HostEnvironment::new("development").is_development());
        assert!(!HostEnvironment::default().is_development());
        assert_eq!(HostEnvironment::default().as_str(), "Production");
    }
}
