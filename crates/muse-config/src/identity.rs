use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Identity provider holding per-user private metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Base URL of the Clerk Backend API
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Clerk secret key
    pub secret_key: SecretString,
    /// Private metadata field that stores the free usage counter
    #[serde(default = "default_usage_field")]
    pub usage_field: String,
    /// Timeout for identity API calls in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> Url {
    Url::parse("https://api.clerk.com/v1/").expect("valid default URL")
}

fn default_usage_field() -> String {
    "free_usage".to_owned()
}

const fn default_timeout_secs() -> u64 {
    10
}
