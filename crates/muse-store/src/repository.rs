use async_trait::async_trait;

use crate::{CreationRecord, NewCreation, StoreError};

/// Append-only store of creation records
#[async_trait]
pub trait CreationRepository: Send + Sync {
    /// Insert one record with finalized content
    async fn insert(&self, creation: NewCreation) -> Result<CreationRecord, StoreError>;

    /// A user's records, newest first
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CreationRecord>, StoreError>;

    /// Records marked for the public gallery, newest first
    async fn list_published(&self) -> Result<Vec<CreationRecord>, StoreError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
