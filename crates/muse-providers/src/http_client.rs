use std::time::Duration;

use reqwest::Client;

use crate::ProviderError;

/// HTTP client shared by every adapter built from one configuration
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("muse/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))
}
