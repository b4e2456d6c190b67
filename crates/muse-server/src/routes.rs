use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use muse_core::{Requester, UploadedFile};
use muse_dispatch::{GenerationDispatcher, GenerationRequest, GenerationResponse};
use muse_providers::DEFAULT_ARTICLE_LENGTH;
use muse_store::{CreationRecord, CreationRepository};
use serde::{Deserialize, Serialize};

use crate::extract::{ApiJson, UploadForm};
use crate::{ServerError, Session};

/// Longest article a single request may ask for, in words
const MAX_ARTICLE_LENGTH: u32 = 5000;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: GenerationDispatcher,
    pub repository: Arc<dyn CreationRepository>,
}

/// Generation endpoints under `/api/ai`
pub fn ai_router() -> Router<AppState> {
    Router::new()
        .route("/api/ai/generate-article", post(generate_article))
        .route("/api/ai/generate-blog-title", post(generate_blog_title))
        .route("/api/ai/generate-image", post(generate_image))
        .route("/api/ai/remove-image-background", post(remove_image_background))
        .route("/api/ai/remove-image-object", post(remove_image_object))
        .route("/api/ai/resume-review", post(resume_review))
}

/// Creation history endpoints under `/api/user`
pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/api/user/creations", get(user_creations))
        .route("/api/user/published-creations", get(published_creations))
}

#[derive(Debug, Deserialize)]
struct ArticleBody {
    prompt: String,
    #[serde(default)]
    length: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BlogTitleBody {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct ImageBody {
    prompt: String,
    #[serde(default)]
    publish: bool,
}

#[derive(Debug, Serialize)]
struct CreationsResponse {
    success: bool,
    creations: Vec<CreationRecord>,
}

fn required_prompt(prompt: &str) -> Result<String, ServerError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ServerError::InvalidRequest("Prompt must not be empty".to_owned()));
    }
    Ok(prompt.to_owned())
}

fn require_image(image: &UploadedFile) -> Result<(), ServerError> {
    if image.content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(ServerError::InvalidRequest(format!(
            "Unsupported image type '{}'",
            image.content_type
        )))
    }
}

async fn dispatch(state: &AppState, requester: &Requester, request: GenerationRequest) -> Json<GenerationResponse> {
    let outcome = state.dispatcher.dispatch(requester, request).await;
    Json(outcome.into())
}

async fn generate_article(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(body): ApiJson<ArticleBody>,
) -> Result<Json<GenerationResponse>, ServerError> {
    let prompt = required_prompt(&body.prompt)?;
    let length = body.length.unwrap_or(DEFAULT_ARTICLE_LENGTH);
    if length == 0 || length > MAX_ARTICLE_LENGTH {
        return Err(ServerError::InvalidRequest(format!(
            "Length must be between 1 and {MAX_ARTICLE_LENGTH} words"
        )));
    }

    Ok(dispatch(&state, &requester, GenerationRequest::Article { prompt, length }).await)
}

async fn generate_blog_title(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(body): ApiJson<BlogTitleBody>,
) -> Result<Json<GenerationResponse>, ServerError> {
    let prompt = required_prompt(&body.prompt)?;

    Ok(dispatch(&state, &requester, GenerationRequest::BlogTitle { prompt }).await)
}

async fn generate_image(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(body): ApiJson<ImageBody>,
) -> Result<Json<GenerationResponse>, ServerError> {
    let prompt = required_prompt(&body.prompt)?;

    Ok(dispatch(
        &state,
        &requester,
        GenerationRequest::Image {
            prompt,
            publish: body.publish,
        },
    )
    .await)
}

async fn remove_image_background(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    mut form: UploadForm,
) -> Result<Json<GenerationResponse>, ServerError> {
    let image = form.file("image")?;
    require_image(&image)?;

    Ok(dispatch(&state, &requester, GenerationRequest::BackgroundRemoval { image }).await)
}

async fn remove_image_object(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    mut form: UploadForm,
) -> Result<Json<GenerationResponse>, ServerError> {
    let image = form.file("image")?;
    require_image(&image)?;
    let object = form.text("object")?;

    Ok(dispatch(&state, &requester, GenerationRequest::ObjectRemoval { image, object }).await)
}

async fn resume_review(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    mut form: UploadForm,
) -> Result<Json<GenerationResponse>, ServerError> {
    let resume = form.file("resume")?;

    Ok(dispatch(&state, &requester, GenerationRequest::ResumeReview { resume }).await)
}

/// Liveness probe; answers without a session
pub async fn health() -> &'static str {
    "ok"
}

async fn user_creations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<CreationsResponse>, ServerError> {
    let creations = state.repository.list_by_user(&session.user_id).await?;
    Ok(Json(CreationsResponse {
        success: true,
        creations,
    }))
}

async fn published_creations(State(state): State<AppState>) -> Result<Json<CreationsResponse>, ServerError> {
    let creations = state.repository.list_published().await?;
    Ok(Json(CreationsResponse {
        success: true,
        creations,
    }))
}
