//! HTTP clients for the fact and image endpoints.
//!
//! Each client issues exactly one request per call and folds every failure
//! (transport, status, body) into a [`FetchError`]. Retrying is left to the
//! user's next interaction.

mod fact;
mod image;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::models::{CatImage, Fact};

pub use fact::FactClient;
pub use image::{new_nonce, ImageClient};

/// Default fact endpoint.
pub const DEFAULT_FACT_URL: &str = "https://catfact.ninja/fact";

/// Default image endpoint.
pub const DEFAULT_IMAGE_URL: &str = "https://cataas.com/cat";

/// Recoverable fetch failures. The payload is a reason for logs, never shown
/// to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("fact unavailable: {0}")]
    FactUnavailable(String),

    #[error("image unavailable: {0}")]
    ImageUnavailable(String),
}

/// Something that can produce a fresh fact.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn fetch_fact(&self) -> Result<Fact, FetchError>;
}

/// Something that can produce an image, given a cache-busting nonce.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, nonce: &str) -> Result<CatImage, FetchError>;
}

/// Build the shared reqwest client.
///
/// Without a timeout the transport default applies, which lets a hung request
/// stay pending.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
