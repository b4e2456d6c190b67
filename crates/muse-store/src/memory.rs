use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{CreationRecord, CreationRepository, NewCreation, StoreError};

/// Process-local repository for development and tests
#[derive(Debug, Default)]
pub struct MemoryCreationRepository {
    records: RwLock<Vec<CreationRecord>>,
}

impl MemoryCreationRepository {
    /// Snapshot of every record in insertion order
    pub async fn all(&self) -> Vec<CreationRecord> {
        self.records.read().await.clone()
    }

    fn newest_first<'a>(records: impl DoubleEndedIterator<Item = &'a CreationRecord>) -> Vec<CreationRecord> {
        // Insertion order breaks ties between equal timestamps
        records.rev().cloned().collect()
    }
}

#[async_trait]
impl CreationRepository for MemoryCreationRepository {
    async fn insert(&self, creation: NewCreation) -> Result<CreationRecord, StoreError> {
        let record = creation.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CreationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(Self::newest_first(records.iter().filter(|r| r.user_id == user_id)))
    }

    async fn list_published(&self) -> Result<Vec<CreationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(Self::newest_first(records.iter().filter(|r| r.publish)))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
