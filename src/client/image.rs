use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use super::{FetchError, ImageSource};
use crate::models::CatImage;

/// A fresh cache-busting token. Never reuse one across requests.
pub fn new_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Client for the image endpoint.
#[derive(Debug, Clone)]
pub struct ImageClient {
    url: String,
    client: Client,
}

impl ImageClient {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// The endpoint URL with `nonce` appended as its query.
    pub fn url_for(&self, nonce: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, nonce)
    }

    async fn request(&self, url: &str) -> Result<CatImage, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {}", e))?;
        if body.is_empty() {
            return Err("empty body".to_string());
        }
        CatImage::from_bytes(body.to_vec())
            .ok_or_else(|| format!("{} bytes do not form a known image", body.len()))
    }
}

#[async_trait]
impl ImageSource for ImageClient {
    async fn fetch_image(&self, nonce: &str) -> Result<CatImage, FetchError> {
        let url = self.url_for(nonce);
        tracing::debug!(url = %url, "Fetching image");
        match self.request(&url).await {
            Ok(image) => {
                tracing::debug!(format = %image.format(), len = image.len(), "Image fetched");
                Ok(image)
            }
            Err(reason) => {
                tracing::warn!(url = %url, "Image fetch failed: {}", reason);
                Err(FetchError::ImageUnavailable(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_nonce_as_query() {
        let client = ImageClient::new("https://cataas.com/cat", Client::new());
        assert_eq!(client.url_for("abc"), "https://cataas.com/cat?abc");
    }

    #[test]
    fn extends_existing_query() {
        let client = ImageClient::new("https://cataas.com/cat?type=square", Client::new());
        assert_eq!(
            client.url_for("abc"),
            "https://cataas.com/cat?type=square&abc"
        );
    }

    #[test]
    fn nonces_are_unique() {
        let a = new_nonce();
        let b = new_nonce();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
