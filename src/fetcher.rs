//! Metadata token retrieval

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Source of the signed metadata token
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the raw token text. One attempt, no retry.
    async fn fetch_token(&self) -> Result<String, FetchError>;
}

/// Fetches the token with an HTTP GET against a fixed URL
#[derive(Debug, Clone)]
pub struct HttpMetadataSource {
    client: Client,
    url: Url,
}

impl HttpMetadataSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch_token(&self) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: self.url.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        tracing::debug!(url = %self.url, bytes = body.len(), "Fetched metadata token");
        Ok(body)
    }
}
