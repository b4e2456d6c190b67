#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod clerk;
mod committer;
mod error;
mod policy;
mod store;

use std::sync::Arc;

pub use clerk::ClerkUsageStore;
pub use committer::{CommitSettings, UsageCommitter};
pub use error::QuotaError;
pub use policy::{Decision, DenialReason, Quota, QuotaPolicy, UsageSink};
pub use store::{MemoryUsageStore, UsageStore};

use muse_config::{Config, UsageStoreKind};

/// Build the configured usage store
///
/// # Errors
///
/// Returns an error if the identity section is missing for the Clerk store
/// or its HTTP client cannot be built
pub fn build_store(config: &Config) -> Result<Arc<dyn UsageStore>, QuotaError> {
    match config.quota.store {
        UsageStoreKind::Clerk => {
            let identity = config
                .identity
                .as_ref()
                .ok_or_else(|| QuotaError::Config("clerk usage store requires [identity]".to_owned()))?;
            Ok(Arc::new(ClerkUsageStore::new(identity)?))
        }
        UsageStoreKind::Memory => {
            tracing::warn!("using in-memory usage counters; free usage resets on restart");
            Ok(Arc::new(MemoryUsageStore::default()))
        }
    }
}
