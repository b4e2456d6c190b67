use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failures raised by vendor adapters
///
/// Every variant is terminal for the request. The display text is what the
/// user sees, so vendor bodies are passed through unchanged.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The vendor needed for this request has no configuration
    #[error("{0} provider is not configured")]
    NotConfigured(&'static str),

    /// Transport failure reaching the vendor (DNS, TLS, timeout)
    #[error("{0}")]
    Upstream(String),

    /// The vendor answered with a non-success status
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The vendor answered 2xx with a body we could not use
    #[error("{provider} returned a malformed response: {message}")]
    Malformed { provider: &'static str, message: String },

    /// The user-supplied input cannot be processed
    #[error("{0}")]
    InvalidInput(String),

    /// The adapter could not be constructed
    #[error("provider configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Machine-readable code for the response body
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_request",
            Self::NotConfigured(_)
            | Self::Upstream(_)
            | Self::Api { .. }
            | Self::Malformed { .. }
            | Self::Config(_) => "provider_error",
        }
    }

    pub(crate) fn upstream(provider: &'static str, error: &reqwest::Error) -> Self {
        tracing::error!(provider, error = %error, "upstream request failed");
        Self::Upstream(error.to_string())
    }

    pub(crate) async fn from_response(provider: &'static str, response: reqwest::Response) -> Self {
        let status = response.status();
        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_owned());

        tracing::warn!(provider, status = %status, "upstream returned error");

        Self::Api {
            provider,
            status: status.as_u16(),
            message,
        }
    }
}
