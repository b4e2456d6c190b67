#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod memory;
mod postgres;
mod record;
mod repository;

use std::sync::Arc;

pub use error::StoreError;
pub use memory::MemoryCreationRepository;
pub use postgres::PgCreationRepository;
pub use record::{CreationRecord, NewCreation};
pub use repository::CreationRepository;

use muse_config::DatabaseConfig;
use secrecy::ExposeSecret;

/// Build the configured creation repository
///
/// Connects to Postgres and ensures the schema when a URL is configured,
/// otherwise falls back to the in-memory repository.
pub async fn build_repository(config: &DatabaseConfig) -> Result<Arc<dyn CreationRepository>, StoreError> {
    match &config.url {
        Some(url) => {
            let repository = PgCreationRepository::connect(url.expose_secret(), config.max_connections).await?;
            tracing::info!(max_connections = config.max_connections, "connected to creation database");
            Ok(Arc::new(repository))
        }
        None => {
            tracing::warn!("no database url configured; creations are kept in memory");
            Ok(Arc::new(MemoryCreationRepository::default()))
        }
    }
}
