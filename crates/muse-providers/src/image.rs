use async_trait::async_trait;
use bytes::Bytes;
use muse_config::ImageProviderConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{ProviderError, Result};

const PROVIDER: &str = "image";

/// Trait for text-to-image vendors
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render an image for the prompt and return the encoded bytes
    async fn generate(&self, prompt: &str) -> Result<Bytes>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// `ClipDrop` text-to-image API
pub struct ClipDropImage {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl ClipDropImage {
    pub fn new(client: Client, config: &ImageProviderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn generate_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/text-to-image/v1")
    }
}

#[async_trait]
impl ImageGenerator for ClipDropImage {
    async fn generate(&self, prompt: &str) -> Result<Bytes> {
        let form = reqwest::multipart::Form::new().text("prompt", prompt.to_owned());

        tracing::debug!(prompt_len = prompt.len(), "sending text-to-image request");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-api-key", self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::upstream(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let image = response.bytes().await.map_err(|e| ProviderError::upstream(PROVIDER, &e))?;

        if image.is_empty() {
            return Err(ProviderError::Malformed {
                provider: PROVIDER,
                message: "empty image body".to_owned(),
            });
        }

        tracing::debug!(bytes = image.len(), "text-to-image complete");

        Ok(image)
    }

    fn name(&self) -> &str {
        "clipdrop"
    }
}
