//! Cloudinary image hosting and transformations

use std::fmt::Write as _;

use async_trait::async_trait;
use base64::Engine as _;
use muse_config::HostingConfig;
use muse_core::UploadedFile;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{ProviderError, Result};

const PROVIDER: &str = "hosting";

/// Transformation applied by the image host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOperation {
    RemoveBackground,
    /// Generative removal of the object described by the label
    RemoveObject(String),
}

/// A stored image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    /// Host-assigned identifier used to address derived images
    pub public_id: String,
    /// Durable HTTPS URL of the stored image
    pub url: String,
}

/// Trait for image hosting vendors
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store an image and return its durable location
    async fn upload(&self, image: &UploadedFile) -> Result<HostedImage>;

    /// Store an image and return the URL of the transformed result
    async fn transform(&self, image: &UploadedFile, operation: &ImageOperation) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Cloudinary upload API with signed requests
pub struct CloudinaryHost {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    api_url: Url,
    delivery_url: Url,
}

#[derive(Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

impl CloudinaryHost {
    pub fn new(client: Client, config: &HostingConfig) -> Self {
        Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_url: config.api_url.clone(),
            delivery_url: config.delivery_url.clone(),
        }
    }

    fn upload_url(&self) -> String {
        let base = self.api_url.as_str().trim_end_matches('/');
        format!("{base}/{}/image/upload", self.cloud_name)
    }

    /// Delivery URL that applies generative object removal on first request
    fn object_removal_url(&self, public_id: &str, label: &str) -> Result<String> {
        let mut url = self.delivery_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Config(format!("delivery_url cannot be a base: {}", self.delivery_url)))?
            .pop_if_empty()
            .push(&self.cloud_name)
            .push("image")
            .push("upload")
            .push(&format!("e_gen_remove:prompt_{label}"))
            .extend(public_id.split('/'));
        Ok(url.into())
    }

    async fn signed_upload(&self, image: &UploadedFile, transformation: Option<&str>) -> Result<UploadResponse> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut params = vec![("timestamp", timestamp)];
        if let Some(transformation) = transformation {
            params.push(("transformation", transformation.to_owned()));
        }
        let signature = sign(&params, &self.api_secret);

        let mut form = reqwest::multipart::Form::new()
            .text("file", data_uri(image))
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        tracing::debug!(bytes = image.len(), transformation, "uploading image");

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::upstream(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        response.json().await.map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: &UploadedFile) -> Result<HostedImage> {
        let uploaded = self.signed_upload(image, None).await?;
        Ok(HostedImage {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn transform(&self, image: &UploadedFile, operation: &ImageOperation) -> Result<String> {
        match operation {
            ImageOperation::RemoveBackground => {
                let uploaded = self.signed_upload(image, Some("e_background_removal")).await?;
                Ok(uploaded.secure_url)
            }
            ImageOperation::RemoveObject(label) => {
                let uploaded = self.signed_upload(image, None).await?;
                self.object_removal_url(&uploaded.public_id, label)
            }
        }
    }

    fn name(&self) -> &str {
        "cloudinary"
    }
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, then the
/// secret appended, hashed with SHA-256
fn sign(params: &[(&str, String)], secret: &SecretString) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.expose_secret().as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(64);
    for byte in digest {
        // Writing hex to a String is infallible
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn data_uri(image: &UploadedFile) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
    format!("data:{};base64,{encoded}", image.content_type)
}
