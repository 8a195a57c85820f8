//! HTTP access for providers that consult a hosting API.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::core::GopmError;

const USER_AGENT: &str = concat!("gopm/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of a metadata request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

/// Plain GET access to hosting APIs.
///
/// Non-success statuses are returned, not raised; only transport failures are errors.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Performs a GET request.
    async fn get(&self, url: &str) -> Result<MetadataResponse>;
}

/// [`MetadataClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestMetadataClient {
    client: Client,
}

impl ReqwestMetadataClient {
    /// Builds a client with gopm's user agent and timeouts.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
        })
    }
}

#[async_trait]
impl MetadataClient for ReqwestMetadataClient {
    async fn get(&self, url: &str) -> Result<MetadataResponse> {
        let network_error = |e: reqwest::Error| GopmError::NetworkError {
            operation: format!("GET {url}"),
            reason: e.to_string(),
        };
        tracing::debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network_error)?;
        Ok(MetadataResponse {
            status,
            body,
        })
    }
}
