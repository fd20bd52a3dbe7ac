use std::time::Duration;

use async_trait::async_trait;
use models::{CatalogWriteEntry, ServiceTypeEntry};
use tracing::{debug, info};

use crate::errors::ClientError;

/// Access to the remote service-type collection.
///
/// The Web API is collection-replace: `replace` always submits the full
/// desired list, never item-level deltas. Implementations are constructed
/// once per session and shared.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the full catalog.
    async fn fetch(&self) -> Result<Vec<ServiceTypeEntry>, ClientError>;

    /// Replace the whole collection with `entries`.
    async fn replace(&self, entries: &[CatalogWriteEntry]) -> Result<(), ClientError>;
}

/// HTTP implementation speaking to the Web API.
pub struct WebApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl WebApiClient {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/servicetypes", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.header("x-api-key", token),
            None => req,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status { status: status.as_u16(), body })
    }
}

#[async_trait]
impl CatalogClient for WebApiClient {
    async fn fetch(&self) -> Result<Vec<ServiceTypeEntry>, ClientError> {
        let resp = self
            .authorize(self.http.get(self.endpoint()))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let entries = Self::check(resp)
            .await?
            .json::<Vec<ServiceTypeEntry>>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        debug!(count = entries.len(), "fetched service-type catalog");
        Ok(entries)
    }

    async fn replace(&self, entries: &[CatalogWriteEntry]) -> Result<(), ClientError> {
        let resp = self
            .authorize(self.http.put(self.endpoint()))
            .json(entries)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::check(resp).await?;
        info!(count = entries.len(), "replaced service-type catalog");
        Ok(())
    }
}
