use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Upstream generation vendors
///
/// Each vendor is optional; requests that need a missing vendor fail with
/// a provider error instead of preventing startup.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Chat-completions vendor used for every text generation
    #[serde(default)]
    pub text: Option<TextProviderConfig>,
    /// Text-to-image vendor
    #[serde(default)]
    pub image: Option<ImageProviderConfig>,
    /// Image hosting and transformation vendor
    #[serde(default)]
    pub hosting: Option<HostingConfig>,
    /// Timeout applied to every outbound vendor call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            text: None,
            image: None,
            hosting: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProvidersConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// OpenAI-compatible chat completions vendor (Groq, Gemini, `OpenAI`)
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextProviderConfig {
    /// Base URL up to and including the API version segment
    #[serde(default = "default_text_base_url")]
    pub base_url: Url,
    /// API key
    pub api_key: SecretString,
    /// Model used for all text generations
    #[serde(default = "default_text_model")]
    pub model: String,
    /// Optional model override for resume reviews
    #[serde(default)]
    pub resume_model: Option<String>,
}

/// `ClipDrop` text-to-image vendor
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageProviderConfig {
    /// Base URL override
    #[serde(default = "default_image_base_url")]
    pub base_url: Url,
    /// API key
    pub api_key: SecretString,
}

/// Cloudinary image hosting
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostingConfig {
    /// Cloud name that scopes uploads and delivery URLs
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used to sign uploads
    pub api_secret: SecretString,
    /// Upload API base URL
    #[serde(default = "default_hosting_api_url")]
    pub api_url: Url,
    /// Delivery base URL for transformed images
    #[serde(default = "default_hosting_delivery_url")]
    pub delivery_url: Url,
}

const fn default_timeout_secs() -> u64 {
    60
}

fn default_text_base_url() -> Url {
    Url::parse("https://api.groq.com/openai/v1").expect("valid default URL")
}

fn default_text_model() -> String {
    "llama-3.3-70b-versatile".to_owned()
}

fn default_image_base_url() -> Url {
    Url::parse("https://clipdrop-api.co").expect("valid default URL")
}

fn default_hosting_api_url() -> Url {
    Url::parse("https://api.cloudinary.com/v1_1").expect("valid default URL")
}

fn default_hosting_delivery_url() -> Url {
    Url::parse("https://res.cloudinary.com").expect("valid default URL")
}
