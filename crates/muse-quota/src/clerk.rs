use std::time::Duration;

use async_trait::async_trait;
use muse_config::IdentityConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::{QuotaError, UsageStore};

/// Usage counters kept in Clerk user private metadata
///
/// Clerk offers no atomic increment, so `increment` writes
/// `observed + 1`. Concurrent requests from one user can therefore
/// overshoot the free limit slightly.
#[derive(Clone)]
pub struct ClerkUsageStore {
    http: reqwest::Client,
    api_url: Url,
    secret_key: SecretString,
    usage_field: String,
}

#[derive(Deserialize)]
struct ClerkUser {
    #[serde(default)]
    private_metadata: serde_json::Map<String, serde_json::Value>,
}

impl ClerkUsageStore {
    /// Create a new store from identity configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &IdentityConfig) -> Result<Self, QuotaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            secret_key: config.secret_key.clone(),
            usage_field: config.usage_field.clone(),
        })
    }

    /// `{api_url}/users/{user_id}[/{suffix}]` with the id percent-encoded
    fn user_url(&self, user_id: &str, suffix: Option<&str>) -> Result<Url, QuotaError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| QuotaError::Config(format!("identity api_url cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .push("users")
            .push(user_id)
            .extend(suffix);
        Ok(url)
    }

    async fn error_from(response: reqwest::Response) -> QuotaError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        QuotaError::Api { status, message }
    }
}

#[async_trait]
impl UsageStore for ClerkUsageStore {
    async fn current(&self, user_id: &str) -> Result<u64, QuotaError> {
        let response = self
            .http
            .get(self.user_url(user_id, None)?)
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let user: ClerkUser = response.json().await?;

        match user.private_metadata.get(&self.usage_field) {
            None | Some(serde_json::Value::Null) => Ok(0),
            Some(value) => value.as_u64().ok_or_else(|| QuotaError::Malformed {
                user_id: user_id.to_owned(),
                message: format!("{} is not a non-negative integer: {value}", self.usage_field),
            }),
        }
    }

    async fn increment(&self, user_id: &str, observed: u64) -> Result<u64, QuotaError> {
        let next = observed.saturating_add(1);

        let mut metadata = serde_json::Map::new();
        metadata.insert(self.usage_field.clone(), next.into());

        let response = self
            .http
            .patch(self.user_url(user_id, Some("metadata"))?)
            .bearer_auth(self.secret_key.expose_secret())
            .json(&serde_json::json!({ "private_metadata": metadata }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(next)
    }

    fn name(&self) -> &'static str {
        "clerk"
    }
}

impl std::fmt::Debug for ClerkUsageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkUsageStore")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}
