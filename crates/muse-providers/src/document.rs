use async_trait::async_trait;
use muse_core::UploadedFile;

use crate::{ProviderError, Result};

/// Message returned for any PDF the extractor cannot read
const UNREADABLE_PDF: &str = "Failed to read PDF. Upload a valid, text-based PDF.";

/// Trait for turning an uploaded document into plain text
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text(&self, document: &UploadedFile) -> Result<String>;
}

/// PDF text extraction on the blocking thread pool
///
/// `pdf-extract` panics on some malformed documents. The panic stays on the
/// blocking thread and surfaces here as a [`tokio::task::JoinError`], so the
/// workspace must not build with `panic = "abort"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_text(&self, document: &UploadedFile) -> Result<String> {
        let bytes = document.bytes.clone();

        let text = match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, bytes = document.len(), "pdf extraction failed");
                return Err(ProviderError::InvalidInput(UNREADABLE_PDF.to_owned()));
            }
            Err(e) => {
                tracing::warn!(error = %e, bytes = document.len(), "pdf extraction panicked");
                return Err(ProviderError::InvalidInput(UNREADABLE_PDF.to_owned()));
            }
        };

        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput(
                "No readable text found in the uploaded PDF.".to_owned(),
            ));
        }

        Ok(text)
    }
}
