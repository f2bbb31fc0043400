//! Lookup of techs in the external tech API.

use crate::error::{VendorsError, VendorsErrorExt};
use crate::models::TechInfo;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt::Debug;
use tracing::{debug, instrument};
use url::Url;

/// Finds techs by the subject their tokens carry.
#[async_trait]
pub trait LookupTechs: Debug + Send + Sync {
    /// `Ok(None)` when the tech API does not know `subject`.
    ///
    /// # Errors
    /// Fails when the tech API is unreachable or answers with an unexpected status.
    async fn find_tech(&self, subject: &str) -> Result<Option<TechInfo>, VendorsError>;
}

/// [`LookupTechs`] over HTTP. `GET {base}/techs/{subject}`.
#[derive(Debug, Clone)]
pub struct TechApiHttp {
    client: Client,
    base: Url,
}

impl TechApiHttp {
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn new(base: Url) -> Result<Self, VendorsError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Building tech API client")?;
        Ok(Self::with_client(client, base))
    }

    pub const fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn tech_url(&self, subject: &str) -> Result<Url, VendorsError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| VendorsError::Internal {
                message: format!("'{}' cannot be a base URL", self.base).into(),
                context: Some("Building tech API URL".into()),
            })?
            .pop_if_empty()
            .push("techs")
            .push(subject);
        Ok(url)
    }
}

#[async_trait]
impl LookupTechs for TechApiHttp {
    #[instrument(skip(self))]
    async fn find_tech(&self, subject: &str) -> Result<Option<TechInfo>, VendorsError> {
        let url = self.tech_url(subject)?;
        let response = self.client.get(url).send().await.context("Calling tech API")?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("Tech API does not know the subject");
                Ok(None)
            },
            status if status.is_success() => {
                let tech = response.json::<TechInfo>().await.context("Reading tech record")?;
                Ok(Some(tech))
            },
            status => Err(VendorsError::TechApi {
                message: format!("unexpected status {status}").into(),
                context: Some(format!("Looking up tech '{subject}'").into()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(base: &str) -> TechApiHttp {
        TechApiHttp::with_client(Client::new(), Url::parse(base).expect("valid url"))
    }

    #[test]
    fn urls_are_built_under_the_base_path() {
        let url = lookup("http://techs.local/api/").tech_url("tech-1").expect("url");
        assert_eq!(url.as_str(), "http://techs.local/api/techs/tech-1");

        let url = lookup("http://techs.local").tech_url("tech-1").expect("url");
        assert_eq!(url.as_str(), "http://techs.local/techs/tech-1");
    }

    #[test]
    fn subjects_are_escaped_as_one_segment() {
        let url = lookup("http://techs.local/").tech_url("a/b c").expect("url");
        assert_eq!(url.as_str(), "http://techs.local/techs/a%2Fb%20c");
    }
}
