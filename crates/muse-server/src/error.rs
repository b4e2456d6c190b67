use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use muse_core::HttpError;
use muse_dispatch::GenerationResponse;
use muse_quota::QuotaError;
use muse_store::StoreError;
use thiserror::Error;

/// Errors raised before or around a dispatch
///
/// Dispatcher outcomes never produce these; they cover bad input, missing
/// sessions and failures of the read-side collaborators.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing, malformed or expired session token
    #[error("{0}")]
    Unauthorized(String),

    /// Request body failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// Usage counter could not be read for a free-tier requester
    #[error("usage lookup failed: {0}")]
    Usage(#[from] QuotaError),

    /// Creation history could not be read
    #[error("creation lookup failed: {0}")]
    Store(#[from] StoreError),
}

impl HttpError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Usage(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Usage(_) => "provider_error",
            Self::Store(_) => "persistence_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Usage(_) => "Could not read usage for this account. Try again later.".to_owned(),
            Self::Store(_) => "Could not load creations. Try again later.".to_owned(),
            Self::Unauthorized(_) | Self::InvalidRequest(_) => self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::Usage(e) => tracing::error!(error = %e, "usage lookup failed"),
            Self::Store(e) => tracing::error!(error = %e, "creation lookup failed"),
            Self::Unauthorized(_) | Self::InvalidRequest(_) => {}
        }

        let body = GenerationResponse::failure(self.code(), self.client_message());
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}
