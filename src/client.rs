use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;
use wreq::{Client, header};

use crate::config::SwissPostConfig;
use crate::error::SearchError;
use crate::provider::LocalityProvider;
use crate::types::LocalityQuery;

/// HTTP client for the Swiss Post localities search
pub struct SwissPostClient {
    http_client: Client,
    endpoint: Url,
    config: SwissPostConfig,
}

impl SwissPostClient {
    pub fn new() -> Result<Self> {
        Self::with_config(SwissPostConfig::default())
    }

    pub fn with_config(config: SwissPostConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid localities endpoint: {}", config.endpoint))?;

        let mut http_builder = Client::builder().gzip(true).brotli(true).zstd(true);

        if let Some(timeout) = config.timeout {
            http_builder = http_builder.timeout(timeout);
        }

        if let Some(ref proxy_url) = config.proxy {
            http_builder = http_builder.proxy(
                wreq::Proxy::all(proxy_url)
                    .with_context(|| format!("Invalid proxy URL: {}", proxy_url))?,
            );
        }

        let http_client = http_builder
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            endpoint,
            config,
        })
    }

    /// Settings the client was built with
    pub fn config(&self) -> &SwissPostConfig {
        &self.config
    }

    /// Endpoint with the search parameters appended
    fn request_url(&self, query: &LocalityQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &query.text)
            .append_pair("limit", &self.config.limit.to_string())
            .append_pair("type", query.kind.as_str())
            .append_pair("language", &self.config.language);
        url
    }
}

impl fmt::Debug for SwissPostClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwissPostClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LocalityProvider for SwissPostClient {
    async fn search(&self, query: &LocalityQuery) -> Result<String, SearchError> {
        let url = self.request_url(query);
        tracing::debug!(q = %query.text, kind = %query.kind, "querying localities endpoint");

        let response = self
            .http_client
            .get(url.as_str())
            .header(header::ACCEPT, "application/json")
            .header(header::ACCEPT_LANGUAGE, &self.config.language)
            .send()
            .await
            .map_err(|e| SearchError::Network {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SearchError::Network {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchType;

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[tokio::test]
    async fn test_request_url_zip() {
        let client = SwissPostClient::new().unwrap();
        let url = client.request_url(&LocalityQuery::new("1000"));

        assert_eq!(url.host_str(), Some("api.swisspost.ch"));
        assert_eq!(url.path(), "/locations/v1/localities/search");
        assert_eq!(
            pairs(&url),
            vec![
                ("q".to_string(), "1000".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("type".to_string(), "zip".to_string()),
                ("language".to_string(), "fr".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_request_url_encodes_locality() {
        let client = SwissPostClient::new().unwrap();
        let query = LocalityQuery::new("La Chaux-de-Fonds & co");
        assert_eq!(query.kind, SearchType::Locality);

        let url = client.request_url(&query);
        let pairs = pairs(&url);
        assert_eq!(pairs[0].1, "La Chaux-de-Fonds & co");
        assert_eq!(pairs[2].1, "locality");
    }

    #[tokio::test]
    async fn test_keeps_config() {
        let config = SwissPostConfig {
            endpoint: "http://127.0.0.1:8080/search".to_string(),
            language: "it".to_string(),
            ..Default::default()
        };
        let client = SwissPostClient::with_config(config.clone()).unwrap();
        assert_eq!(client.config(), &config);
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let config = SwissPostConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(SwissPostClient::with_config(config).is_err());
    }
}
