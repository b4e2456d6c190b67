use muse_providers::ProviderError;
use muse_quota::DenialReason;
use muse_store::StoreError;
use serde::{Deserialize, Serialize};

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Generated text or the URL of the resulting image
    Success { content: String },
    /// Turned away by the quota policy before any provider call
    Denied(DenialReason),
    /// A provider or persistence step failed
    Failed { code: &'static str, message: String },
}

impl Outcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Denied(_) => "denied",
            Self::Failed { .. } => "failed",
        }
    }

    pub(crate) fn provider_failure(error: &ProviderError) -> Self {
        Self::Failed {
            code: error.code(),
            message: error.to_string(),
        }
    }

    pub(crate) fn persistence_failure(error: &StoreError) -> Self {
        Self::Failed {
            code: "persistence_error",
            message: error.to_string(),
        }
    }
}

/// Uniform response body for every generation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl GenerationResponse {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            message: None,
            code: None,
        }
    }

    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            message: Some(message.into()),
            code: Some(code.to_owned()),
        }
    }
}

impl From<Outcome> for GenerationResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success { content } => Self::success(content),
            Outcome::Denied(reason) => Self::failure(reason.code(), reason.message()),
            Outcome::Failed { code, message } => Self::failure(code, message),
        }
    }
}
