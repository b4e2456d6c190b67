use chrono::{DateTime, Utc};
use muse_core::CreationType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRecord {
    pub id: Uuid,
    pub user_id: String,
    /// User prompt, or a fixed description for file-based kinds
    pub prompt: String,
    /// Generated text or the URL of the resulting image
    pub content: String,
    #[serde(rename = "type")]
    pub creation_type: CreationType,
    pub publish: bool,
    pub created_at: DateTime<Utc>,
}

/// A record waiting to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCreation {
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    pub creation_type: CreationType,
    pub publish: bool,
}

impl NewCreation {
    pub(crate) fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> CreationRecord {
        CreationRecord {
            id,
            user_id: self.user_id,
            prompt: self.prompt,
            content: self.content,
            creation_type: self.creation_type,
            publish: self.publish,
            created_at,
        }
    }
}
