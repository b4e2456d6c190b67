//! OpenAI-compatible chat completions provider

use async_trait::async_trait;
use muse_config::TextProviderConfig;
use muse_core::GenerationKind;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ProviderError, Result, TextPrompt};

const PROVIDER: &str = "text";

/// Trait for text generation vendors
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Run a single-turn completion and return the generated text
    async fn complete(&self, prompt: &TextPrompt) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Chat completions client for Groq, Gemini's `OpenAI` endpoint or `OpenAI`
pub struct OpenAiCompatibleText {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    model: String,
    resume_model: Option<String>,
}

impl OpenAiCompatibleText {
    pub fn new(client: Client, config: &TextProviderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            resume_model: config.resume_model.clone(),
        }
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    fn model_for(&self, kind: GenerationKind) -> &str {
        match (kind, &self.resume_model) {
            (GenerationKind::ResumeReview, Some(model)) => model.as_str(),
            _ => self.model.as_str(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextProvider for OpenAiCompatibleText {
    async fn complete(&self, prompt: &TextPrompt) -> Result<String> {
        let model = self.model_for(prompt.kind);
        let wire_request = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt.instruction,
            }],
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
        };

        tracing::debug!(kind = %prompt.kind, model, max_tokens = prompt.max_tokens, "sending chat completion");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ProviderError::upstream(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let wire_response: ChatResponse = response.json().await.map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        wire_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Malformed {
                provider: PROVIDER,
                message: "response contained no message content".to_owned(),
            })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer, resume_model: Option<&str>) -> OpenAiCompatibleText {
        let config = TextProviderConfig {
            base_url: Url::parse(&format!("{}/openai/v1/", server.uri())).unwrap(),
            api_key: SecretString::from("gsk_test"),
            model: "llama-3.3-70b-versatile".to_owned(),
            resume_model: resume_model.map(str::to_owned),
        };
        let client = crate::http_client::http_client(Duration::from_secs(5)).unwrap();
        OpenAiCompatibleText::new(client, &config)
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }]
        })
    }

    #[tokio::test]
    async fn sends_article_prompt_and_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b-versatile",
                "max_tokens": 250,
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("# An article")))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server, None)
            .complete(&TextPrompt::article("X", 50))
            .await
            .unwrap();

        assert_eq!(text, "# An article");
    }

    #[tokio::test]
    async fn resume_reviews_use_override_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": "gemini-2.0-flash", "max_tokens": 1500 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Strengths: ...")))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server, Some("gemini-2.0-flash"))
            .complete(&TextPrompt::resume_review("Jane Doe"))
            .await
            .unwrap();

        assert_eq!(text, "Strengths: ...");
    }

    #[tokio::test]
    async fn empty_choices_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = provider(&server, None)
            .complete(&TextPrompt::blog_title("idea"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Malformed { .. }));
        assert_eq!(err.code(), "provider_error");
    }

    #[tokio::test]
    async fn vendor_errors_keep_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
            .mount(&server)
            .await;

        let err = provider(&server, None)
            .complete(&TextPrompt::blog_title("idea"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "text API error (429): rate limit exceeded");
    }
}
