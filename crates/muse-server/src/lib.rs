#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod cors;
mod error;
mod extract;
mod routes;
mod session;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use muse_config::Config;
use muse_dispatch::GenerationDispatcher;
use muse_providers::{PdfExtractor, VendorAdapter};
use muse_quota::{CommitSettings, Quota, QuotaPolicy, UsageCommitter};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

pub use error::ServerError;
pub use routes::AppState;
pub use session::{Session, SessionVerifier};

/// How long shutdown waits for queued usage increments
const COMMIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    committer_task: JoinHandle<()>,
}

impl Server {
    /// Build the server from configuration
    ///
    /// Connects the creation database, builds vendor clients and starts the
    /// background usage committer.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let usage_store = muse_quota::build_store(&config)?;
        tracing::info!(store = usage_store.name(), free_limit = config.quota.free_limit, "usage store ready");

        let (committer, committer_task) =
            UsageCommitter::spawn(Arc::clone(&usage_store), CommitSettings::from(&config.quota));
        let quota = Quota::new(QuotaPolicy::new(config.quota.free_limit), Arc::new(committer));

        let adapter = VendorAdapter::from_config(&config.providers)?;
        let repository = muse_store::build_repository(&config.database).await?;
        tracing::info!(repository = repository.name(), "creation repository ready");

        let dispatcher = GenerationDispatcher::new(
            quota,
            Arc::new(adapter),
            Arc::new(PdfExtractor),
            Arc::clone(&repository),
        );
        let state = AppState { dispatcher, repository };

        let verifier = SessionVerifier::new(&config.session);

        // Usage is only read for generation routes
        let ai_routes = routes::ai_router().layer(axum::middleware::from_fn(move |req, next| {
            let store = Arc::clone(&usage_store);
            async move { session::resolve_usage(store, req, next).await }
        }));

        let api_routes = ai_routes
            .merge(routes::user_router())
            .layer(axum::middleware::from_fn(move |req, next| {
                let verifier = verifier.clone();
                async move { session::authenticate(verifier, req, next).await }
            }))
            .with_state(state);

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(routes::health));
        }

        app = app.merge(api_routes);

        // Apply middleware layers (innermost first)
        app = app.layer(DefaultBodyLimit::max(config.server.body_limit_bytes));
        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
            committer_task,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address, e.g. from the command line
    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener. The usage
    /// committer keeps running until the router is dropped.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered, then waits briefly
    /// for queued usage increments to be written.
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        // The router and every committer handle are gone, so the task ends
        // once the queue is empty
        if tokio::time::timeout(COMMIT_DRAIN_TIMEOUT, self.committer_task).await.is_err() {
            tracing::warn!("timed out waiting for pending usage increments");
        }

        Ok(())
    }
}
