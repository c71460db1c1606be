// src/services/fetcher.rs

//! Document fetching.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::TargetConfig;
use crate::utils::http::create_async_client;

/// Source of raw page markup.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `url`, failing on transport or HTTP errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches documents over HTTP(S).
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with a client configured from the target settings.
    pub fn from_config(config: &TargetConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        log::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
