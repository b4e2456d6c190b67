use std::sync::Arc;
use std::time::Instant;

use muse_core::Requester;
use muse_providers::{DocumentExtractor, ImageOperation, ProviderAdapter, ProviderError, TextPrompt};
use muse_quota::{Decision, Quota};
use muse_store::{CreationRepository, NewCreation};
use muse_telemetry::metrics::GenerationMetrics;
use tracing::Instrument;

use crate::{GenerationRequest, Outcome};

/// Largest resume accepted for review
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Runs one generation request through gate, provider, persistence and
/// usage settlement
///
/// Steps are awaited in order and the first failure ends the request. A
/// failed insert does not undo the provider call, and usage is only
/// settled after the record exists.
#[derive(Clone)]
pub struct GenerationDispatcher {
    quota: Quota,
    adapter: Arc<dyn ProviderAdapter>,
    extractor: Arc<dyn DocumentExtractor>,
    repository: Arc<dyn CreationRepository>,
    metrics: GenerationMetrics,
}

impl GenerationDispatcher {
    pub fn new(
        quota: Quota,
        adapter: Arc<dyn ProviderAdapter>,
        extractor: Arc<dyn DocumentExtractor>,
        repository: Arc<dyn CreationRepository>,
    ) -> Self {
        Self {
            quota,
            adapter,
            extractor,
            repository,
            metrics: GenerationMetrics::new(),
        }
    }

    /// Dispatch a request on behalf of a resolved requester
    ///
    /// Never fails: denials and step failures are folded into the outcome.
    pub async fn dispatch(&self, requester: &Requester, request: GenerationRequest) -> Outcome {
        let kind = request.kind();
        let start = Instant::now();
        let span = tracing::info_span!(
            "generation",
            kind = %kind,
            user_id = %requester.user_id,
            tier = %requester.tier,
        );

        let outcome = self.run(requester, request).instrument(span).await;

        self.metrics.record(kind.into(), outcome.label(), start);
        outcome
    }

    async fn run(&self, requester: &Requester, request: GenerationRequest) -> Outcome {
        let kind = request.kind();

        if let Decision::Deny(reason) = self.quota.check(kind, requester) {
            tracing::info!(reason = reason.code(), usage = requester.usage, "generation denied");
            return Outcome::Denied(reason);
        }

        let content = match self.invoke(&request).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "provider call failed");
                return Outcome::provider_failure(&e);
            }
        };

        let creation = NewCreation {
            user_id: requester.user_id.clone(),
            prompt: request.record_prompt(),
            content: content.clone(),
            creation_type: kind.creation_type(),
            publish: request.publish(),
        };

        match self.repository.insert(creation).await {
            Ok(record) => tracing::debug!(creation_id = %record.id, "creation recorded"),
            Err(e) => {
                // The provider already did the work; nothing is rolled back
                tracing::error!(error = %e, repository = self.repository.name(), "failed to record creation");
                return Outcome::persistence_failure(&e);
            }
        }

        if self.quota.commit(requester) {
            tracing::debug!(observed = requester.usage, "usage increment queued");
        }

        Outcome::Success { content }
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        match request {
            GenerationRequest::Article { prompt, length } => {
                self.adapter.generate_text(&TextPrompt::article(prompt, *length)).await
            }
            GenerationRequest::BlogTitle { prompt } => self.adapter.generate_text(&TextPrompt::blog_title(prompt)).await,
            GenerationRequest::Image { prompt, .. } => self.adapter.generate_image(prompt).await,
            GenerationRequest::BackgroundRemoval { image } => {
                self.adapter.transform_image(image, &ImageOperation::RemoveBackground).await
            }
            GenerationRequest::ObjectRemoval { image, object } => {
                self.adapter
                    .transform_image(image, &ImageOperation::RemoveObject(object.clone()))
                    .await
            }
            GenerationRequest::ResumeReview { resume } => {
                if resume.len() > MAX_RESUME_BYTES {
                    return Err(ProviderError::InvalidInput(
                        "Resume file size exceeds allowed size (5MB).".to_owned(),
                    ));
                }

                let text = self.extractor.extract_text(resume).await?;
                self.adapter.generate_text(&TextPrompt::resume_review(&text)).await
            }
        }
    }
}

impl std::fmt::Debug for GenerationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationDispatcher")
            .field("quota", &self.quota)
            .field("repository", &self.repository.name())
            .finish_non_exhaustive()
    }
}
