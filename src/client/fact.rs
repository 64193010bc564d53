use async_trait::async_trait;
use reqwest::Client;

use super::{FactSource, FetchError};
use crate::models::Fact;

/// Client for the fact endpoint.
#[derive(Debug, Clone)]
pub struct FactClient {
    url: String,
    client: Client,
}

impl FactClient {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    async fn request(&self) -> Result<Fact, String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }

        // Decode from bytes rather than `Response::json` so a non-JSON body
        // is reported as a decode error with serde's message.
        let body = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {}", e))?;
        serde_json::from_slice(&body).map_err(|e| format!("malformed body: {}", e))
    }
}

#[async_trait]
impl FactSource for FactClient {
    async fn fetch_fact(&self) -> Result<Fact, FetchError> {
        tracing::debug!(url = %self.url, "Fetching fact");
        self.request().await.map_err(|reason| {
            tracing::warn!(url = %self.url, "Fact fetch failed: {}", reason);
            FetchError::FactUnavailable(reason)
        })
    }
}
