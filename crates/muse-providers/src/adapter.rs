use std::sync::Arc;

use async_trait::async_trait;
use muse_config::ProvidersConfig;
use muse_core::UploadedFile;

use crate::{
    ClipDropImage, CloudinaryHost, ImageGenerator, ImageHost, ImageOperation, OpenAiCompatibleText, ProviderError,
    Result, TextPrompt, TextProvider, http_client::http_client,
};

/// Uniform capability interface over every generation vendor
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Generate text for an article, blog titles or a resume review
    async fn generate_text(&self, prompt: &TextPrompt) -> Result<String>;

    /// Render an image from a prompt and return its durable URL
    async fn generate_image(&self, prompt: &str) -> Result<String>;

    /// Apply a hosted transformation to an uploaded image and return the result URL
    async fn transform_image(&self, source: &UploadedFile, operation: &ImageOperation) -> Result<String>;
}

/// Adapter backed by the configured vendors
///
/// Vendors are optional; a capability whose vendor is missing fails with
/// [`ProviderError::NotConfigured`].
#[derive(Default, Clone)]
pub struct VendorAdapter {
    text: Option<Arc<dyn TextProvider>>,
    image: Option<Arc<dyn ImageGenerator>>,
    host: Option<Arc<dyn ImageHost>>,
}

impl VendorAdapter {
    /// Build clients for every configured vendor
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be built
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let client = http_client(config.timeout())?;

        let adapter = Self {
            text: config
                .text
                .as_ref()
                .map(|text| Arc::new(OpenAiCompatibleText::new(client.clone(), text)) as Arc<dyn TextProvider>),
            image: config
                .image
                .as_ref()
                .map(|image| Arc::new(ClipDropImage::new(client.clone(), image)) as Arc<dyn ImageGenerator>),
            host: config
                .hosting
                .as_ref()
                .map(|hosting| Arc::new(CloudinaryHost::new(client.clone(), hosting)) as Arc<dyn ImageHost>),
        };

        tracing::info!(
            text = adapter.text.as_ref().map(|p| p.name()),
            image = adapter.image.as_ref().map(|p| p.name()),
            hosting = adapter.host.as_ref().map(|p| p.name()),
            "generation vendors initialized"
        );

        Ok(adapter)
    }

    #[must_use]
    pub fn with_text(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.text = Some(provider);
        self
    }

    #[must_use]
    pub fn with_image(mut self, provider: Arc<dyn ImageGenerator>) -> Self {
        self.image = Some(provider);
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: Arc<dyn ImageHost>) -> Self {
        self.host = Some(host);
        self
    }

    fn text(&self) -> Result<&dyn TextProvider> {
        self.text.as_deref().ok_or(ProviderError::NotConfigured("text"))
    }

    fn image(&self) -> Result<&dyn ImageGenerator> {
        self.image.as_deref().ok_or(ProviderError::NotConfigured("image"))
    }

    fn host(&self) -> Result<&dyn ImageHost> {
        self.host.as_deref().ok_or(ProviderError::NotConfigured("hosting"))
    }
}

#[async_trait]
impl ProviderAdapter for VendorAdapter {
    async fn generate_text(&self, prompt: &TextPrompt) -> Result<String> {
        self.text()?.complete(prompt).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        // Fail before spending image credits when there is nowhere to store the result
        let host = self.host()?;
        let bytes = self.image()?.generate(prompt).await?;

        let hosted = host.upload(&UploadedFile::new(bytes, "image/png")).await?;
        Ok(hosted.url)
    }

    async fn transform_image(&self, source: &UploadedFile, operation: &ImageOperation) -> Result<String> {
        self.host()?.transform(source, operation).await
    }
}

impl std::fmt::Debug for VendorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorAdapter")
            .field("text", &self.text.is_some())
            .field("image", &self.image.is_some())
            .field("host", &self.host.is_some())
            .finish()
    }
}
