// src/nea/client.rs
use async_trait::async_trait;
use reqwest::header;
use crate::nea::config::ReadingConfig;
use crate::utils::error::FetchError;

/// Source of the raw PSI page text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the full body at `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches the page over HTTP with a single GET. No retries, no caching.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &ReadingConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(config)?,
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Creates a reqwest client configured from the reading config.
fn build_client(config: &ReadingConfig) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| FetchError::Client(e.to_string()))
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!("Downloading PSI page from: {}", url);
        tracing::debug!("Using User-Agent: {}", self.user_agent);

        let response = self.client.get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?; // Propagates reqwest::Error as FetchError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(FetchError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

        Ok(body)
    }
}
