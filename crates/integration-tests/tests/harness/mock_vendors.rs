//! Mock vendor backends for integration tests
//!
//! One server stands in for the identity provider (user private metadata),
//! the chat completions vendor, the text-to-image vendor and the image host.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use bytes::Bytes;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Canned completion returned by the mock text vendor
pub const COMPLETION: &str = "Hello from mock LLM";

/// PNG signature returned as the generated image
pub const GENERATED_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nmock";

/// Mock vendor backends with request counters
pub struct MockVendors {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    usage: Mutex<HashMap<String, u64>>,
    completions: Mutex<Vec<serde_json::Value>>,
    metadata_updates: AtomicU32,
    image_generations: AtomicU32,
    uploads: AtomicU32,
    fail_text: AtomicBool,
    fail_identity: AtomicBool,
}

impl MockVendors {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/clerk/v1/users/{user_id}", routing::get(handle_get_user))
            .route("/clerk/v1/users/{user_id}/metadata", routing::patch(handle_update_metadata))
            .route("/openai/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/clipdrop/text-to-image/v1", routing::post(handle_text_to_image))
            .route("/cloudinary/v1_1/{cloud}/image/upload", routing::post(handle_upload))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// URL of a path on the mock server
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("valid mock URL")
    }

    /// Seed a user's stored usage counter
    pub fn set_usage(&self, user_id: &str, usage: u64) {
        self.state.usage.lock().unwrap().insert(user_id.to_owned(), usage);
    }

    /// Stored usage counter for a user, if one was ever written
    pub fn usage(&self, user_id: &str) -> Option<u64> {
        self.state.usage.lock().unwrap().get(user_id).copied()
    }

    /// Wait until a user's stored counter reaches `expected`
    ///
    /// Increments are committed in the background after the response is sent.
    pub async fn wait_for_usage(&self, user_id: &str, expected: u64) -> bool {
        for _ in 0..100 {
            if self.usage(user_id) == Some(expected) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Make the text vendor answer every request with a 500
    pub fn fail_text(&self) {
        self.state.fail_text.store(true, Ordering::Relaxed);
    }

    /// Make the identity provider answer user lookups with a 500
    pub fn fail_identity(&self) {
        self.state.fail_identity.store(true, Ordering::Relaxed);
    }

    /// Chat completion request bodies received, oldest first
    pub fn completions(&self) -> Vec<serde_json::Value> {
        self.state.completions.lock().unwrap().clone()
    }

    /// Number of metadata PATCH requests received
    pub fn metadata_updates(&self) -> u32 {
        self.state.metadata_updates.load(Ordering::Relaxed)
    }

    /// Number of text-to-image requests received
    pub fn image_generations(&self) -> u32 {
        self.state.image_generations.load(Ordering::Relaxed)
    }

    /// Number of image uploads received
    pub fn uploads(&self) -> u32 {
        self.state.uploads.load(Ordering::Relaxed)
    }
}

impl Drop for MockVendors {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Identity provider --

async fn handle_get_user(State(state): State<Arc<MockState>>, Path(user_id): Path<String>) -> impl IntoResponse {
    if state.fail_identity.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "errors": [{ "message": "internal error" }] })),
        );
    }

    let usage = state.usage.lock().unwrap().get(&user_id).copied();

    let private_metadata = usage.map_or_else(|| serde_json::json!({}), |n| serde_json::json!({ "free_usage": n }));

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": user_id,
            "private_metadata": private_metadata,
        })),
    )
}

#[derive(Debug, Deserialize)]
struct MetadataUpdate {
    private_metadata: HashMap<String, serde_json::Value>,
}

async fn handle_update_metadata(
    State(state): State<Arc<MockState>>,
    Path(user_id): Path<String>,
    Json(update): Json<MetadataUpdate>,
) -> impl IntoResponse {
    state.metadata_updates.fetch_add(1, Ordering::Relaxed);

    let Some(usage) = update.private_metadata.get("free_usage").and_then(serde_json::Value::as_u64) else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "free_usage missing").into_response();
    };
    state.usage.lock().unwrap().insert(user_id.clone(), usage);

    Json(serde_json::json!({ "id": user_id, "private_metadata": { "free_usage": usage } })).into_response()
}

// -- Text vendor --

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    Json(request): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.completions.lock().unwrap().push(request.clone());

    if state.fail_text.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": {
                    "message": "mock server intentional failure",
                    "type": "server_error"
                }
            })),
        )
            .into_response();
    }

    Json(serde_json::json!({
        "id": "chatcmpl-test-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": request["model"],
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": COMPLETION },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

// -- Image vendors --

async fn handle_text_to_image(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.image_generations.fetch_add(1, Ordering::Relaxed);
    ([(header::CONTENT_TYPE, "image/png")], GENERATED_IMAGE)
}

async fn handle_upload(
    State(state): State<Arc<MockState>>,
    Path(cloud): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let n = state.uploads.fetch_add(1, Ordering::Relaxed) + 1;
    let public_id = format!("muse/upload_{n}");

    // Background removal arrives as an eager transformation on the upload
    let removes_background = body.windows(20).any(|w| w == b"e_background_removal");
    let secure_url = if removes_background {
        format!("https://res.cloudinary.com/{cloud}/image/upload/e_background_removal/{public_id}.png")
    } else {
        format!("https://res.cloudinary.com/{cloud}/image/upload/{public_id}.png")
    };

    Json(serde_json::json!({
        "public_id": public_id,
        "secure_url": secure_url,
    }))
}
